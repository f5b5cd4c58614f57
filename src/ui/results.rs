//! Analysis results view
//!
//! Pure rendering of `PipelineState`. The text shown for a finished analysis
//! comes from `ResultSummary` so it can be checked without a renderer.

use chrono::Local;
use iced::widget::{button, column, image, progress_bar, row, text, Column};
use iced::{Alignment, Color, ContentFit, Element, Length};

use super::{disclaimer, panel, ACCENT, BORDER, SURFACE, TEXT_MUTED, TEXT_STRONG};
use crate::state::data::{DetectionResult, Severity};
use crate::state::pipeline::PipelineState;
use crate::Message;

const RECOMMENDATIONS: [&str; 3] = [
    "Schedule an appointment with an ophthalmologist",
    "Get a comprehensive eye examination",
    "Discuss treatment options with your doctor",
];

/// Everything the result card displays, derived from one `DetectionResult`
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub headline: &'static str,
    pub detail: &'static str,
    pub has_cataract: bool,
    /// Bar fill, 0-100
    pub confidence: f32,
    pub confidence_label: String,
    /// Only surfaced for positive detections
    pub severity: Option<Severity>,
    pub recommendations: &'static [&'static str],
    pub analyzed_label: String,
}

impl ResultSummary {
    pub fn new(result: &DetectionResult) -> Self {
        let (headline, detail) = if result.has_cataract {
            (
                "Cataract Detected",
                "Potential signs of cataract found in the image",
            )
        } else {
            (
                "No Cataract Detected",
                "No significant cataract indicators detected",
            )
        };

        let recommendations: &'static [&'static str] = if result.has_cataract {
            &RECOMMENDATIONS
        } else {
            &[]
        };

        Self {
            headline,
            detail,
            has_cataract: result.has_cataract,
            confidence: result.confidence as f32,
            confidence_label: format!("{:.1}%", result.confidence),
            severity: result.has_cataract.then_some(result.severity),
            recommendations,
            analyzed_label: format!(
                "Analyzed on {}",
                result
                    .analyzed_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

/// Badge colors: (text, background, border)
fn severity_palette(severity: Severity) -> (Color, Color, Color) {
    match severity {
        Severity::Mild => (
            Color::from_rgb8(0xCA, 0x8A, 0x04),
            Color::from_rgb8(0xFE, 0xFC, 0xE8),
            Color::from_rgb8(0xFE, 0xF0, 0x8A),
        ),
        Severity::Moderate => (
            Color::from_rgb8(0xEA, 0x58, 0x0C),
            Color::from_rgb8(0xFF, 0xF7, 0xED),
            Color::from_rgb8(0xFE, 0xD7, 0xAA),
        ),
        Severity::Severe => (
            Color::from_rgb8(0xDC, 0x26, 0x26),
            Color::from_rgb8(0xFE, 0xF2, 0xF2),
            Color::from_rgb8(0xFE, 0xCA, 0xCA),
        ),
    }
}

/// The results screen; `preview` is the decoded selected image
pub fn view<'a>(state: &'a PipelineState, preview: Option<&image::Handle>) -> Element<'a, Message> {
    let reset = button(text("↺  Analyze New Image").size(14))
        .on_press(Message::Reset)
        .padding([8, 16])
        .style(button::secondary);

    let preview_panel: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => text("Preview unavailable").color(TEXT_MUTED).into(),
    };

    let image_card = panel(
        column![
            text("Uploaded Image").size(16).color(TEXT_STRONG),
            preview_panel
        ]
        .spacing(12),
        SURFACE,
        BORDER,
    );

    let body: Element<'a, Message> = match state {
        PipelineState::Idle => Column::new().into(),
        PipelineState::Analyzing { .. } => analyzing_view(),
        PipelineState::Complete { result, .. } => result_view(ResultSummary::new(result)),
        PipelineState::Failed { reason, .. } => failure_view(reason),
    };

    let results_card = panel(
        column![text("Analysis Results").size(16).color(TEXT_STRONG), body].spacing(12),
        SURFACE,
        BORDER,
    );

    column![
        reset,
        row![image_card, results_card].spacing(24),
        disclaimer(
            "Important:",
            "These results are generated by AI and are for informational purposes only. \
             This is not a medical diagnosis. Please consult with a qualified eye care \
             professional for accurate diagnosis and treatment recommendations."
        ),
    ]
    .spacing(24)
    .max_width(960)
    .into()
}

fn analyzing_view<'a>() -> Element<'a, Message> {
    column![
        text("⏳").size(40).color(ACCENT),
        text("Analyzing image...").size(16).color(TEXT_STRONG),
        text("This may take a moment").size(13).color(TEXT_MUTED),
    ]
    .spacing(8)
    .padding([48, 0])
    .width(Length::Fill)
    .align_x(Alignment::Center)
    .into()
}

fn result_view<'a>(summary: ResultSummary) -> Element<'a, Message> {
    let (banner_text, banner_bg, banner_border, icon) = if summary.has_cataract {
        (
            Color::from_rgb8(0x7F, 0x1D, 0x1D),
            Color::from_rgb8(0xFE, 0xF2, 0xF2),
            Color::from_rgb8(0xFE, 0xCA, 0xCA),
            "⚠",
        )
    } else {
        (
            Color::from_rgb8(0x14, 0x53, 0x2D),
            Color::from_rgb8(0xF0, 0xFD, 0xF4),
            Color::from_rgb8(0xBB, 0xF7, 0xD0),
            "✔",
        )
    };

    let banner = panel(
        row![
            text(icon).size(22).color(banner_text),
            column![
                text(summary.headline).size(16).color(banner_text),
                text(summary.detail).size(13).color(banner_text),
            ]
            .spacing(4)
        ]
        .spacing(12),
        banner_bg,
        banner_border,
    );

    let confidence = panel(
        column![
            row![
                text("Confidence Level").size(13).color(TEXT_STRONG),
                iced::widget::horizontal_space(),
                text(summary.confidence_label.clone()).size(13).color(TEXT_STRONG),
            ],
            progress_bar(0.0..=100.0, summary.confidence).height(Length::Fixed(10.0)),
        ]
        .spacing(8),
        Color::from_rgb8(0xF8, 0xFA, 0xFC),
        BORDER,
    );

    let severity = summary.severity.map(|severity| {
        let (fg, bg, border) = severity_palette(severity);
        panel(
            text(format!("Severity: {}", severity.label())).size(13).color(fg),
            bg,
            border,
        )
    });

    let recommendations = (!summary.recommendations.is_empty()).then(|| {
        let items = summary
            .recommendations
            .iter()
            .fold(Column::new().spacing(6), |col, item| {
                col.push(text(format!("•  {}", item)).size(13).color(Color::from_rgb8(0x1E, 0x40, 0xAF)))
            });
        panel(
            column![
                text("Recommended Actions").size(13).color(Color::from_rgb8(0x1E, 0x3A, 0x8A)),
                items
            ]
            .spacing(8),
            Color::from_rgb8(0xEF, 0xF6, 0xFF),
            Color::from_rgb8(0xBF, 0xDB, 0xFE),
        )
    });

    Column::new()
        .spacing(12)
        .push(banner)
        .push(confidence)
        .push_maybe(severity)
        .push(text(summary.analyzed_label).size(11).color(TEXT_MUTED))
        .push_maybe(recommendations)
        .into()
}

fn failure_view<'a>(reason: &'a str) -> Element<'a, Message> {
    let red = Color::from_rgb8(0x99, 0x1B, 0x1B);
    column![
        panel(
            column![
                text("Analysis Failed").size(16).color(red),
                text(reason).size(13).color(red),
            ]
            .spacing(4),
            Color::from_rgb8(0xFE, 0xF2, 0xF2),
            Color::from_rgb8(0xFE, 0xCA, 0xCA),
        ),
        button(text("Retry Analysis").size(14))
            .on_press(Message::Retry)
            .padding([8, 16]),
    ]
    .spacing(12)
    .into()
}
