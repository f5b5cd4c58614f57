/// User interface module
///
/// Views are plain functions of application state returning `Element`s:
/// - Header with the service status (header.rs)
/// - Landing view with the upload and camera cards (sources.rs)
/// - Analysis results and their view-model (results.rs)

pub mod header;
pub mod results;
pub mod sources;

use iced::widget::{container, text, Container};
use iced::{Border, Color, Element, Length, Theme};

use crate::Message;

pub const TEXT_STRONG: Color = Color::from_rgb(0.12, 0.16, 0.23);
pub const TEXT_MUTED: Color = Color::from_rgb(0.39, 0.45, 0.55);
pub const ACCENT: Color = Color::from_rgb(0.15, 0.39, 0.92);
pub const SURFACE: Color = Color::WHITE;
pub const BORDER: Color = Color::from_rgb(0.89, 0.91, 0.94);

/// Rounded card with a fill and a 1px border
pub fn panel<'a>(
    content: impl Into<Element<'a, Message>>,
    background: Color,
    border: Color,
) -> Container<'a, Message> {
    container(content)
        .padding(20)
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(background.into()),
            border: Border {
                color: border,
                width: 1.0,
                radius: 12.0.into(),
            },
            ..container::Style::default()
        })
}

/// The medical disclaimer shown under both views
pub fn disclaimer<'a>(lead: &'a str, body: &'a str) -> Element<'a, Message> {
    panel(
        text(format!("{} {}", lead, body))
            .size(13)
            .color(Color::from_rgb(0.47, 0.21, 0.06)),
        Color::from_rgb(1.0, 0.98, 0.92),
        Color::from_rgb(0.99, 0.90, 0.54),
    )
    .into()
}
