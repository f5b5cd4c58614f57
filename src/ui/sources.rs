//! Landing view: headline, the two image source cards, and the disclaimer

use iced::widget::{button, column, container, image, row, text, Column};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use super::{disclaimer, panel, ACCENT, BORDER, SURFACE, TEXT_MUTED, TEXT_STRONG};
use crate::source::camera::CameraPhase;
use crate::Message;

const ERROR_TEXT: Color = Color::from_rgb(0.86, 0.15, 0.15);

/// What the upload card needs to render
pub struct UploadCard<'a> {
    /// A file read is running; the picker stays closed until it finishes
    pub pending: bool,
    pub error: Option<&'a str>,
}

/// What the camera card needs to render
pub struct CameraCard<'a> {
    pub phase: CameraPhase,
    pub error: Option<&'a str>,
    pub viewfinder: Option<&'a image::Handle>,
}

pub fn view<'a>(upload: UploadCard<'a>, camera: CameraCard<'a>) -> Element<'a, Message> {
    let intro = column![
        text("AI-Powered Cataract Detection").size(32).color(TEXT_STRONG),
        text(
            "Upload an eye image or use your camera to detect potential cataracts. \
             Our system analyzes the image and provides instant results."
        )
        .size(15)
        .color(TEXT_MUTED),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    column![
        intro,
        row![upload_card(upload), camera_card(camera)].spacing(24),
        disclaimer(
            "Medical Disclaimer:",
            "This tool is for educational purposes only and should not be used as a \
             substitute for professional medical advice. Always consult with a qualified \
             healthcare provider for proper diagnosis and treatment."
        ),
    ]
    .spacing(32)
    .max_width(960)
    .align_x(Alignment::Center)
    .into()
}

fn upload_card<'a>(upload: UploadCard<'a>) -> Element<'a, Message> {
    let label = if upload.pending { "Loading..." } else { "Choose File" };

    let content = Column::new()
        .spacing(12)
        .align_x(Alignment::Center)
        .push(text("⬆").size(36).color(ACCENT))
        .push(text("Upload Image").size(20).color(TEXT_STRONG))
        .push(text("Select an eye image from your device").size(13).color(TEXT_MUTED))
        .push_maybe(upload.error.map(|e| text(e).size(12).color(ERROR_TEXT)))
        .push(
            button(text(label).size(14))
                .on_press_maybe((!upload.pending).then_some(Message::ChooseFile))
                .padding([10, 24]),
        );

    panel(content, SURFACE, BORDER).into()
}

fn camera_card<'a>(camera: CameraCard<'a>) -> Element<'a, Message> {
    match camera.phase {
        CameraPhase::Idle => {
            let content = Column::new()
                .spacing(12)
                .align_x(Alignment::Center)
                .push(text("📷").size(36).color(ACCENT))
                .push(text("Use Camera").size(20).color(TEXT_STRONG))
                .push(text("Take a photo using your device camera").size(13).color(TEXT_MUTED))
                .push_maybe(camera.error.map(|e| text(e).size(12).color(ERROR_TEXT)))
                .push(
                    button(text("Open Camera").size(14))
                        .on_press(Message::OpenCamera)
                        .padding([10, 24]),
                );

            panel(content, SURFACE, BORDER).into()
        }
        CameraPhase::Streaming => {
            let viewfinder: Element<'a, Message> = match camera.viewfinder {
                Some(handle) => image(handle.clone())
                    .width(Length::Fill)
                    .content_fit(ContentFit::Cover)
                    .into(),
                None => text("Starting camera...").color(Color::WHITE).into(),
            };

            let screen = container(viewfinder)
                .width(Length::Fill)
                .height(Length::Fixed(300.0))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(300.0))
                .style(|_theme: &Theme| container::Style {
                    background: Some(Color::from_rgb(0.06, 0.09, 0.16).into()),
                    ..container::Style::default()
                });

            let controls = row![
                button(text("Capture Photo").size(14))
                    .on_press(Message::CapturePhoto)
                    .padding([10, 24])
                    .width(Length::Fill),
                button(text("Cancel").size(14))
                    .on_press(Message::CancelCamera)
                    .padding([10, 24])
                    .style(button::secondary),
            ]
            .spacing(12);

            panel(column![screen, controls].spacing(16), SURFACE, ACCENT).into()
        }
    }
}
