use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use iced::widget::image::Handle;
use iced::widget::{column, container, row, stack, text};
use iced::{Element, Length, Subscription, Task, Theme};
use rand::rngs::StdRng;
use rand::SeedableRng;

use proxalert_core::alert::alert_controller::{Alert, AlertController};
use proxalert_core::alert::gps;
use proxalert_core::shared::detection::Detection;

use crate::settings::Settings;
use crate::theme;
use crate::views::{log_console, map_panel, toast, video_panel};
use crate::workers::messaging_worker::{self, ConnectionStatus, MessagingEvent};
use crate::workers::recognition_worker::{self, RecognitionMessage, RecognitionParams};

/// Frames arriving faster than this are dropped; the newest one wins.
const VIDEO_TICK: Duration = Duration::from_millis(33);
const GPS_TICK: Duration = Duration::from_secs(15);
const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone)]
pub enum Message {
    VideoTick,
    GpsTick,
}

pub struct App {
    recognition_rx: Receiver<RecognitionMessage>,
    recognition_stop: Arc<AtomicBool>,
    messaging_rx: Receiver<MessagingEvent>,
    messaging_stop: Arc<AtomicBool>,
    alert_tx: Sender<String>,

    controller: AlertController,
    rng: StdRng,

    map_background: Option<Handle>,
    video: Option<Handle>,
    detections: Vec<Detection>,
    active_alert: Option<Alert>,
    banner: Option<String>,
    connection: ConnectionStatus,
    worker_status: Option<String>,
    log_lines: Vec<String>,
    toast: Option<(String, Instant)>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        // Write the file back so a first run leaves an editable config behind.
        settings.save();

        let (recognition_rx, recognition_stop) = recognition_worker::spawn(RecognitionParams {
            camera_url: settings.camera_url.clone(),
            gallery_dir: settings.gallery_dir.clone(),
            threshold: settings.match_threshold,
        });

        let (alert_tx, alert_rx) = crossbeam_channel::unbounded::<String>();
        let (messaging_rx, messaging_stop) = messaging_worker::spawn(settings.domain_id, alert_rx);

        let mut app = Self {
            recognition_rx,
            recognition_stop,
            messaging_rx,
            messaging_stop,
            alert_tx,
            controller: AlertController::new(Duration::from_secs(settings.cooldown_seconds)),
            rng: StdRng::from_entropy(),
            map_background: load_map_background(),
            video: None,
            detections: Vec::new(),
            active_alert: None,
            banner: None,
            connection: ConnectionStatus::Connecting,
            worker_status: None,
            log_lines: Vec::new(),
            toast: None,
        };
        app.push_log("Proximity alert system starting");

        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::VideoTick => {
                self.drain_recognition();
                self.drain_messaging();
                if let Some((_, shown_at)) = &self.toast {
                    if shown_at.elapsed() >= toast::TOAST_DURATION {
                        self.toast = None;
                    }
                }
            }
            Message::GpsTick => {
                let fix = gps::simulate_fix(&mut self.rng);
                self.push_log(&format!("[GPS] Simulated location: {fix}"));
            }
        }
        Task::none()
    }

    fn drain_recognition(&mut self) {
        let mut latest = None;
        let pending: Vec<_> = self.recognition_rx.try_iter().collect();
        for message in pending {
            match message {
                RecognitionMessage::Frame(frame, detections) => {
                    latest = Some((frame, detections));
                }
                RecognitionMessage::DownloadProgress(downloaded, total) => {
                    self.worker_status = Some(if total > 0 {
                        format!("downloading models\u{2026} {}%", downloaded * 100 / total)
                    } else {
                        "downloading models\u{2026}".to_string()
                    });
                }
                RecognitionMessage::Status(status) => {
                    self.push_log(&status);
                    self.worker_status = Some(status);
                }
                RecognitionMessage::Fatal(error) => {
                    let line = format!("Recognition stopped: {error}");
                    self.push_log(&line);
                    self.worker_status = Some(line);
                }
            }
        }

        if let Some((frame, detections)) = latest {
            self.video = Some(video_panel::annotate(&frame, &detections));
            if let Some(alert) = self
                .controller
                .observe(&detections, Instant::now(), &mut self.rng)
            {
                self.fire_alert(alert);
            }
            self.detections = detections;
        }
    }

    fn fire_alert(&mut self, alert: Alert) {
        self.banner = Some(format!(
            "Alert sent to User: {} was detected 125 meters from the Camera A1",
            alert.identity
        ));
        self.push_log(&format!(
            "Proximity alert sent to user for {}",
            alert.identity
        ));
        self.toast = Some((format!("{} is nearby!", alert.identity), Instant::now()));
        let _ = self.alert_tx.send(format!(
            "Proximity alert: {} detected by Camera A1",
            alert.identity
        ));
        self.active_alert = Some(alert);
    }

    fn drain_messaging(&mut self) {
        let pending: Vec<_> = self.messaging_rx.try_iter().collect();
        for event in pending {
            match event {
                MessagingEvent::Status(status) => {
                    if status != self.connection {
                        match status {
                            ConnectionStatus::Connected => self.push_log("Connected to backend"),
                            ConnectionStatus::Disconnected => {
                                self.push_log("Disconnected from backend")
                            }
                            ConnectionStatus::Failed => self.push_log("Backend connection failed"),
                            ConnectionStatus::Connecting => {}
                        }
                    }
                    self.connection = status;
                }
                MessagingEvent::Log(message) => self.push_log(&message),
                MessagingEvent::Alert(message) => {
                    self.push_log(&message);
                    self.toast = Some((message, Instant::now()));
                }
            }
        }
    }

    fn push_log(&mut self, message: &str) {
        push_line(&mut self.log_lines, log_console::timestamped(message));
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut status = format!("Backend: {}", self.connection);
        if let Some(worker_status) = &self.worker_status {
            status.push_str(" | ");
            status.push_str(worker_status);
        }
        let status_color = match self.connection {
            ConnectionStatus::Connected => theme::user_color(),
            ConnectionStatus::Connecting => theme::marker_color(),
            ConnectionStatus::Disconnected | ConnectionStatus::Failed => {
                theme::alert_text_color()
            }
        };
        let status_line = text(status).size(13).color(status_color);

        let banner: Element<'_, Message> = match &self.banner {
            Some(message) => text(message.as_str())
                .size(16)
                .color(theme::alert_text_color())
                .into(),
            None => text("No alerts yet").size(16).into(),
        };

        let panels = row![
            map_panel::view(self.map_background.as_ref(), self.active_alert.as_ref()),
            video_panel::view(self.video.as_ref(), &self.detections),
        ]
        .spacing(16);

        let main = column![
            container(status_line).center_x(Length::Fill),
            container(panels).center_x(Length::Fill),
            container(banner).center_x(Length::Fill),
            log_console::view(&self.log_lines),
        ]
        .spacing(10)
        .padding(12)
        .height(Length::Fill);

        match &self.toast {
            Some((message, _)) => stack![main, toast::view(message)].into(),
            None => main.into(),
        }
    }

    pub fn theme(&self) -> Theme {
        theme::app_theme()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(VIDEO_TICK).map(|_| Message::VideoTick),
            iced::time::every(GPS_TICK).map(|_| Message::GpsTick),
        ])
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.recognition_stop.store(true, Ordering::Relaxed);
        self.messaging_stop.store(true, Ordering::Relaxed);
    }
}

fn load_map_background() -> Option<Handle> {
    let path = std::env::current_exe().ok()?.parent()?.join("map.png");
    path.exists().then(|| Handle::from_path(path))
}

fn push_line(lines: &mut Vec<String>, line: String) {
    lines.push(line);
    if lines.len() > MAX_LOG_LINES {
        let excess = lines.len() - MAX_LOG_LINES;
        lines.drain(..excess);
    }
}
