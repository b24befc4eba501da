//! Integration tests for the extraction pipeline.
//!
//! Documents are built from synthetic page dumps: a running header and
//! footer on every page, one reaction equation with a drawn arrow as body
//! text, and a labelled figure on page 3.

use exam_chemtext::document::{DocumentDump, PageDump};
use exam_chemtext::exclusion::{ElementBBox, ElementMetadata, ExtractionElement, ZoneSource, ZoneType};
use exam_chemtext::extractors::LineSegment;
use exam_chemtext::layout::TextChar;
use exam_chemtext::noise::{NoiseBand, RegexNoiseFilter};
use exam_chemtext::pipeline::{ExtractionPipeline, PageOutcome, PipelineConfig};

// ============================================================================
// Helper Functions for Creating Mock Data
// ============================================================================

/// Lay out a string as 6pt-wide glyphs starting at `x`.
fn text_chars(text: &str, x: f32, top: f32, size: f32) -> Vec<TextChar> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let x0 = x + i as f32 * 6.0;
            TextChar::new(c.to_string(), x0, top, x0 + 6.0, top + size, size)
        })
        .collect()
}

/// "CO2 H2O" with subscript digits and a wide space for the arrow.
fn reaction_chars() -> Vec<TextChar> {
    vec![
        TextChar::new("C", 100.0, 100.0, 107.0, 110.0, 10.0),
        TextChar::new("O", 107.0, 100.0, 114.0, 110.0, 10.0),
        TextChar::new("2", 114.0, 103.0, 118.0, 110.0, 7.0),
        TextChar::new(" ", 118.0, 100.0, 140.0, 110.0, 10.0),
        TextChar::new("H", 140.0, 100.0, 147.0, 110.0, 10.0),
        TextChar::new("2", 147.0, 103.0, 151.0, 110.0, 7.0),
        TextChar::new("O", 151.0, 100.0, 158.0, 110.0, 10.0),
    ]
}

fn exam_page(number: usize) -> PageDump {
    let mut chars = text_chars("Chemistry Paper", 100.0, 10.0, 10.0);
    chars.extend(reaction_chars());
    chars.extend(text_chars(&format!("Page {}", number), 280.0, 800.0, 10.0));
    if number == 3 {
        chars.extend(text_chars("Fig", 300.0, 400.0, 10.0));
    }
    PageDump {
        width: 595.0,
        height: 842.0,
        chars,
        lines: vec![LineSegment::new(120.0, 105.0, 135.0, 105.0)],
    }
}

fn exam_document() -> DocumentDump {
    DocumentDump::new((1..=5).map(exam_page).collect())
}

/// Figure around the "Fig" label, in pixels at 144 DPI.
fn figure_element() -> ExtractionElement {
    ExtractionElement {
        page: 3,
        element_type: ZoneType::Figure,
        bbox: ElementBBox::Pixels {
            x: 580.0,
            y: 780.0,
            width: 80.0,
            height: 60.0,
        },
        source: ZoneSource::Caption,
        filename: "figure_1.png".to_string(),
    }
}

// ============================================================================
// End-to-End Scenarios
// ============================================================================

#[test]
fn test_reaction_from_json_dump() {
    let json = r#"{
        "pages": [{
            "width": 595.0,
            "height": 842.0,
            "chars": [
                {"text": "C", "x0": 100.0, "top": 100.0, "x1": 107.0, "bottom": 110.0, "size": 10.0},
                {"text": "O", "x0": 107.0, "top": 100.0, "x1": 114.0, "bottom": 110.0, "size": 10.0},
                {"text": "2", "x0": 114.0, "top": 103.0, "x1": 118.0, "bottom": 110.0, "size": 7.0},
                {"text": " ", "x0": 118.0, "top": 100.0, "x1": 140.0, "bottom": 110.0, "size": 10.0},
                {"text": "H", "x0": 140.0, "top": 100.0, "x1": 147.0, "bottom": 110.0, "size": 10.0},
                {"text": "2", "x0": 147.0, "top": 103.0, "x1": 151.0, "bottom": 110.0, "size": 7.0},
                {"text": "O", "x0": 151.0, "top": 100.0, "x1": 158.0, "bottom": 110.0, "size": 10.0}
            ],
            "lines": [
                {"x0": 120.0, "y0": 105.0, "x1": 130.0, "y1": 105.0},
                {"x0": 130.0, "y0": 105.0, "x1": 140.0, "y1": 105.0}
            ]
        }]
    }"#;
    let doc = DocumentDump::from_json(json).unwrap();
    let config = PipelineConfig::default().with_skip_first_page(false);
    let result = ExtractionPipeline::new(config).process(&doc, &[]).unwrap();

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].formatted_text, "CO_{2} -> H_{2}O");
}

#[test]
fn test_equilibrium_arrow() {
    let doc = DocumentDump::new(vec![PageDump {
        width: 595.0,
        height: 842.0,
        chars: reaction_chars(),
        lines: vec![
            LineSegment::new(120.0, 104.0, 135.0, 104.0),
            LineSegment::new(135.0, 106.0, 120.0, 106.0),
        ],
    }]);
    let config = PipelineConfig::default().with_skip_first_page(false);
    let result = ExtractionPipeline::new(config).process(&doc, &[]).unwrap();
    assert_eq!(result.pages[0].formatted_text, "CO_{2} <=> H_{2}O");
}

#[test]
fn test_full_document_with_noise_and_figure() {
    let doc = exam_document();
    let config = PipelineConfig::default().with_dpi(144.0);
    let result = ExtractionPipeline::new(config)
        .process(&doc, &[figure_element()])
        .unwrap();

    // Cover page skipped.
    let numbers: Vec<usize> = result.pages.iter().map(|p| p.page).collect();
    assert_eq!(numbers, vec![2, 3, 4, 5]);

    for page in &result.pages {
        assert_eq!(page.formatted_text, "CO_{2} -> H_{2}O", "page {}", page.page);
        assert_eq!(page.outcome, PageOutcome::Enhanced);
        assert_eq!(page.filtered_char_count, 7);
        assert!(page.plain_text.starts_with("CO"));
    }

    let page3 = result.page(3).unwrap();
    assert_eq!(page3.exclusion_zone_count, 1);
    assert_eq!(page3.total_char_count, 15 + 7 + 6 + 3);

    let zones = result.noise_zones.as_ref().unwrap();
    let header = zones.band(NoiseBand::Header).next().unwrap();
    assert_eq!((header.min, header.max), (0.0, 25.0));
    let footer = zones.band(NoiseBand::Footer).next().unwrap();
    assert_eq!((footer.min, footer.max), (795.0, 842.0));
    assert!(zones.band(NoiseBand::LeftMargin).next().is_none());

    let stats = &result.statistics;
    assert_eq!(stats.pages_processed, 4);
    assert_eq!(stats.pages_with_text, 4);
    assert_eq!(stats.exclusion_zones, 1);
    assert_eq!(stats.enhanced_pages, 4);
    assert_eq!(stats.total_chars_after, 28);
    assert_eq!(stats.total_chars_before, 4 * 28 + 3);

    let formulas = result.formulas();
    assert!(formulas.contains(&"CO_{2}".to_string()));
    assert!(formulas.contains(&"H_{2}O".to_string()));
}

#[test]
fn test_noise_removal_disabled_keeps_headers() {
    let doc = exam_document();
    let config = PipelineConfig::default().with_noise_removal(false);
    let result = ExtractionPipeline::new(config).process(&doc, &[]).unwrap();

    assert!(result.noise_zones.is_none());
    assert_eq!(
        result.page(2).unwrap().formatted_text,
        "Chemistry Paper\nCO_{2} -> H_{2}O\nPage 2"
    );
    // No figure element, so the label survives.
    assert!(result.page(3).unwrap().formatted_text.contains("Fig"));
}

#[test]
fn test_element_on_missing_page_is_ignored() {
    let doc = exam_document();
    let mut element = figure_element();
    element.page = 42;
    let result = ExtractionPipeline::default().process(&doc, &[element]).unwrap();
    assert_eq!(result.statistics.exclusion_zones, 0);
    assert_eq!(result.pages.len(), 4);
}

#[test]
fn test_element_metadata_file() {
    let json = r#"{
        "elements": [
            {"page": 3, "type": "figure", "source": "caption", "filename": "figure_1.png",
             "bbox": {"x": 580, "y": 780, "width": 80, "height": 60}},
            {"page": 4, "type": "table", "source": "pdfplumber", "filename": "table_1.png",
             "bbox": [290.0, 390.0, 330.0, 420.0]}
        ]
    }"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elements.json");
    std::fs::write(&path, json).unwrap();

    let elements = ElementMetadata::from_json_file(&path).unwrap().elements;
    assert_eq!(elements.len(), 2);

    let config = PipelineConfig::default().with_dpi(144.0);
    let result = ExtractionPipeline::new(config).process(&exam_document(), &elements).unwrap();
    assert_eq!(result.statistics.exclusion_zones, 2);
    assert_eq!(result.page(3).unwrap().exclusion_zone_count, 1);
    assert_eq!(result.page(4).unwrap().exclusion_zone_count, 1);
}

#[test]
fn test_output_text_is_stable_under_refiltering() {
    let result = ExtractionPipeline::default().process(&exam_document(), &[]).unwrap();
    let filter = RegexNoiseFilter::default();
    for page in &result.pages {
        assert_eq!(filter.filter_text(&page.formatted_text), page.formatted_text);
        assert_eq!(filter.filter_text(&page.plain_text), page.plain_text);
    }
}
