use iced::widget::{column, container, horizontal_space, row, text};
use iced::{Alignment, Color, Element, Length};

use super::{ACCENT, TEXT_MUTED, TEXT_STRONG};
use crate::Message;

/// Header label for the startup service probe
pub fn service_status_label(online: Option<bool>) -> &'static str {
    match online {
        None => "Checking analysis service...",
        Some(true) => "● Analysis service online",
        Some(false) => "● Analysis service offline",
    }
}

fn service_status_color(online: Option<bool>) -> Color {
    match online {
        None => TEXT_MUTED,
        Some(true) => Color::from_rgb(0.09, 0.64, 0.29),
        Some(false) => Color::from_rgb(0.86, 0.15, 0.15),
    }
}

pub fn view<'a>(service_online: Option<bool>) -> Element<'a, Message> {
    let brand = column![
        text("CataractScan").size(22).color(TEXT_STRONG),
        text("Advanced Eye Health Analysis").size(12).color(TEXT_MUTED),
    ]
    .spacing(2);

    let status = text(service_status_label(service_online))
        .size(12)
        .color(service_status_color(service_online));

    container(
        row![
            text("👁").size(28).color(ACCENT),
            brand,
            horizontal_space(),
            status
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding([16, 24])
    .width(Length::Fill)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_labels() {
        assert!(service_status_label(None).starts_with("Checking"));
        assert!(service_status_label(Some(true)).ends_with("online"));
        assert!(service_status_label(Some(false)).ends_with("offline"));
    }
}
