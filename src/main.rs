use std::path::PathBuf;
use std::time::Duration;

use iced::task;
use iced::widget::image::Handle;
use iced::widget::{column, container, scrollable};
use iced::{Element, Length, Subscription, Task, Theme};
use tracing::{debug, info, warn};

mod api;
mod config;
mod logging;
mod source;
mod state;
mod ui;

use api::AnalysisClient;
use config::Settings;
use source::camera::{CameraProvider, CaptureBackend};
use source::{upload, DeviceBackend};
use state::data::{DetectionResult, EncodedImage};
use state::pipeline::{Generation, Pipeline, Submission};

/// Viewfinder refresh interval while the camera is streaming
const VIEWFINDER_INTERVAL: Duration = Duration::from_millis(100);

/// Main application state, generic over the camera backend
struct CataractScan<B: CaptureBackend> {
    /// Selected image, in-flight analysis and its outcome
    pipeline: Pipeline,
    /// Client for the inference service
    client: AnalysisClient,
    /// Camera image source
    camera: CameraProvider<B>,
    /// Decoded selected image for the results view
    preview: Option<Handle>,
    /// Latest live camera frame
    viewfinder: Option<Handle>,
    /// Shown under the upload card
    upload_error: Option<String>,
    /// Startup probe result; `None` until it answers
    service_online: Option<bool>,
    /// Outstanding analysis task and the submission it belongs to
    in_flight: Option<(Generation, task::Handle)>,
    /// Id handed to the last file read
    uploads: u64,
    /// File read still running, with its id
    pending_upload: Option<(u64, task::Handle)>,
}

/// The application as built: camera backend chosen by the `camera` feature
type App = CataractScan<DeviceBackend>;

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Choose File"
    ChooseFile,
    /// Background file read with the given id finished
    FileLoaded(u64, Result<EncodedImage, String>),
    /// User clicked "Open Camera"
    OpenCamera,
    /// Viewfinder refresh
    CameraTick,
    /// User clicked "Capture Photo"
    CapturePhoto,
    /// User clicked "Cancel" on the live camera
    CancelCamera,
    /// An image source produced a still image
    ImageAcquired(EncodedImage),
    /// The analysis task for a submission finished
    AnalysisFinished(Generation, Result<DetectionResult, String>),
    /// User asked to resubmit after a failure
    Retry,
    /// User clicked "Analyze New Image"
    Reset,
    /// Startup health probe answered
    ServiceChecked(bool),
}

impl<B: CaptureBackend> CataractScan<B> {
    /// Create a new instance of the application
    fn new(settings: Settings, camera: B) -> (Self, Task<Message>) {
        // Building the client only fails if the TLS backend cannot initialize,
        // the app cannot function without it
        let client = AnalysisClient::new(&settings)
            .expect("Failed to initialize HTTP client. Check the TLS setup.");

        info!("🎨 CataractScan initialized, analysis service at {}", client.predict_url());

        let probe = client.clone();
        (
            CataractScan {
                pipeline: Pipeline::new(),
                client,
                camera: CameraProvider::new(camera),
                preview: None,
                viewfinder: None,
                upload_error: None,
                service_online: None,
                in_flight: None,
                uploads: 0,
                pending_upload: None,
            },
            Task::perform(
                async move { probe.check_health().await },
                Message::ServiceChecked,
            ),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFile => {
                if self.pending_upload.is_some() {
                    debug!("File read already running, ignoring");
                    return Task::none();
                }

                // Show the native file picker dialog
                match upload::pick_image_file() {
                    Some(path) => self.start_upload(path),
                    None => Task::none(),
                }
            }
            Message::FileLoaded(id, result) => {
                if self.pending_upload.as_ref().map(|(pending, _)| *pending) != Some(id) {
                    debug!("Discarding stale file read #{}", id);
                    return Task::none();
                }
                self.pending_upload = None;

                match result {
                    Ok(image) => self.acquire(image),
                    Err(e) => {
                        warn!("⚠️  Upload failed: {}", e);
                        self.upload_error = Some(e);
                        Task::none()
                    }
                }
            }
            Message::OpenCamera => {
                self.viewfinder = None;
                self.camera.start();
                Task::none()
            }
            Message::CameraTick => {
                if let Some(frame) = self.camera.preview() {
                    let (width, height) = frame.dimensions();
                    self.viewfinder = Some(Handle::from_rgba(width, height, frame.into_raw()));
                } else if !self.camera.is_streaming() {
                    self.viewfinder = None;
                }
                Task::none()
            }
            Message::CapturePhoto => match self.camera.capture() {
                Some(image) => self.acquire(image),
                None => {
                    if !self.camera.is_streaming() {
                        self.viewfinder = None;
                    }
                    Task::none()
                }
            },
            Message::CancelCamera => {
                self.camera.cancel();
                self.viewfinder = None;
                Task::none()
            }
            Message::ImageAcquired(image) => self.acquire(image),
            Message::AnalysisFinished(generation, outcome) => {
                if self.pipeline.complete(generation, outcome) {
                    self.in_flight = None;
                }
                Task::none()
            }
            Message::Retry => match self.pipeline.retry() {
                Some(submission) => self.start_analysis(submission),
                None => Task::none(),
            },
            Message::Reset => {
                self.abort_in_flight();
                self.abort_upload();
                self.pipeline.reset();
                self.preview = None;
                Task::none()
            }
            Message::ServiceChecked(online) => {
                if online {
                    info!("✅ Analysis service reachable");
                } else {
                    warn!("⚠️  Analysis service not reachable, analyses will fail until it is up");
                }
                self.service_online = Some(online);
                Task::none()
            }
        }
    }

    /// Read `path` in the background; only the newest read may deliver
    fn start_upload(&mut self, path: PathBuf) -> Task<Message> {
        self.upload_error = None;
        self.uploads += 1;
        let id = self.uploads;

        let (task, handle) = Task::perform(
            async move { upload::load_image(path).await.map_err(|e| e.to_string()) },
            move |result| Message::FileLoaded(id, result),
        )
        .abortable();

        self.pending_upload = Some((id, handle));
        task
    }

    /// Select an image from either source and submit it
    fn acquire(&mut self, image: EncodedImage) -> Task<Message> {
        if self.pipeline.state().selected_image().is_some() {
            debug!("An image is already selected, ignoring new one");
            return Task::none();
        }

        // Sources are hidden once an image is selected, release both of them
        self.abort_upload();
        self.camera.cancel();
        self.viewfinder = None;
        self.upload_error = None;
        self.preview = image.decode().ok().map(Handle::from_bytes);

        let submission = self.pipeline.submit(image);
        self.start_analysis(submission)
    }

    /// Launch the network call for a submission as an abortable background task
    fn start_analysis(&mut self, submission: Submission) -> Task<Message> {
        self.abort_in_flight();

        let Submission { generation, image } = submission;
        let client = self.client.clone();
        let (task, handle) = Task::perform(
            async move { client.analyze(&image).await.map_err(|e| e.to_string()) },
            move |outcome| Message::AnalysisFinished(generation, outcome),
        )
        .abortable();

        self.in_flight = Some((generation, handle));
        task
    }

    fn abort_in_flight(&mut self) {
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn abort_upload(&mut self) {
        if let Some((id, handle)) = self.pending_upload.take() {
            debug!("Cancelling file read #{}", id);
            handle.abort();
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let state = self.pipeline.state();

        let body = if state.selected_image().is_some() {
            ui::results::view(state, self.preview.as_ref())
        } else {
            ui::sources::view(
                ui::sources::UploadCard {
                    pending: self.pending_upload.is_some(),
                    error: self.upload_error.as_deref(),
                },
                ui::sources::CameraCard {
                    phase: self.camera.phase(),
                    error: self.camera.error(),
                    viewfinder: self.viewfinder.as_ref(),
                },
            )
        };

        let content = column![
            ui::header::view(self.service_online),
            container(body)
                .padding(32)
                .width(Length::Fill)
                .center_x(Length::Fill),
        ];

        scrollable(content).height(Length::Fill).into()
    }

    /// Drive the viewfinder while the camera is live
    fn subscription(&self) -> Subscription<Message> {
        if self.camera.is_streaming() {
            iced::time::every(VIEWFINDER_INTERVAL).map(|_| Message::CameraTick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    // Settings carry the log level, so logging comes up right after them
    let (settings, config_error) = Settings::load();

    logging::setup_logging(&settings.log_level);
    if let Some(e) = config_error {
        warn!("⚠️  {}; using defaults", e);
    }

    iced::application("CataractScan", App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .centered()
        .run_with(move || App::new(settings, DeviceBackend::default()))
}
