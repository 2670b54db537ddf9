//! # Sixstring - Guitar Tuner GUI
//!
//! The frontend for the Sixstring guitar tuner. It owns the audio capture
//! thread, drives the detection pipeline once per display tick and renders
//! the current stable note with color-coded tuning feedback.
//!
//! ## Architecture
//! - **Main thread**: Iced GUI application with dark theme
//! - **Audio thread**: Owns the CPAL stream, publishes 2048-sample frames
//! - **Communication**: Crossbeam channels for thread-safe data exchange
//! - **Updates**: ~60 FPS tick subscription; each tick reads a snapshot of
//!   the latest frame and steps the tuner once

use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use iced::widget::{column, container, text, Space};
use iced::{Alignment, Color, Element, Length, Subscription, Theme};
use sixstring_core::{audio, ConfidenceTier, NoteEvent, Tuner};

/// Tick interval for the display-refresh subscription (~60 FPS).
const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// How long startup waits for the audio thread to report success or failure.
const AUDIO_SETUP_TIMEOUT: Duration = Duration::from_secs(5);

// Display colors, one per confidence tier plus the idle placeholder.
const EXACT_COLOR: Color = Color::from_rgb(0.49, 0.60, 0.75);
const CLOSE_COLOR: Color = Color::from_rgb(0.89, 0.76, 0.40);
const OFF_COLOR: Color = Color::from_rgb(0.78, 0.40, 0.38);
const IDLE_COLOR: Color = Color::from_rgb(0.91, 0.91, 0.91);

/// Main entry point for the Sixstring application.
pub fn main() -> iced::Result {
    eprintln!("[MAIN] Starting Sixstring guitar tuner...");
    iced::application("Sixstring", TunerApp::update, TunerApp::view)
        .subscription(TunerApp::subscription)
        .theme(TunerApp::theme)
        .run()
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
enum Message {
    /// Timer tick for real-time updates.
    Tick,
}

/// What the note display currently shows.
#[derive(Debug, Clone)]
enum NoteDisplay {
    /// No stable note; show the neutral placeholder.
    Idle,
    /// A stable note, with its deviation from the target in Hz.
    Note {
        symbol: String,
        deviation_hz: f32,
        tier: ConfidenceTier,
    },
}

/// Audio worker thread management structure.
///
/// The CPAL stream is owned by a dedicated thread; this handle lets the
/// GUI shut it down gracefully when the application closes.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

/// Main application state for the Sixstring guitar tuner.
struct TunerApp {
    audio_worker: Option<AudioWorker>,
    frame_receiver: Option<Receiver<Vec<f32>>>,
    sample_rate: u32,
    tuner: Option<Tuner>,
    display: NoteDisplay,
    /// Set when audio acquisition or configuration fails at startup; the
    /// tuner loop never runs in that case.
    startup_error: Option<String>,
}

impl Default for TunerApp {
    fn default() -> Self {
        eprintln!("[MAIN] Creating TunerApp...");
        let mut app = Self {
            audio_worker: None,
            frame_receiver: None,
            sample_rate: 0,
            tuner: None,
            display: NoteDisplay::Idle,
            startup_error: None,
        };

        match Tuner::with_standard_tuning() {
            Ok(tuner) => app.tuner = Some(tuner),
            Err(e) => {
                eprintln!("[MAIN] Invalid reference table: {}", e);
                app.startup_error = Some(format!("Invalid tuning configuration: {}", e));
                return app;
            }
        }

        app.start_audio_capture();
        app
    }
}

impl TunerApp {
    /// Spawns the audio capture thread and waits for it to report a sample
    /// rate (or a failure). On failure the error is recorded once and the
    /// tick handler never processes a frame.
    fn start_audio_capture(&mut self) {
        // A small bound is enough: the consumer only ever wants the latest
        // frame, older ones are deliberately dropped.
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Vec<f32>>(4);
        let (setup_tx, setup_rx) = crossbeam_channel::bounded::<Result<u32, String>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let thread_handle = thread::spawn(move || {
            eprintln!("[AUDIO-THREAD] Starting audio thread...");
            let (stream, sample_rate) = match audio::start_audio_capture(frame_tx) {
                Ok(tuple) => {
                    let _ = setup_tx.send(Ok(tuple.1));
                    tuple
                }
                Err(e) => {
                    eprintln!("[AUDIO-THREAD] Fatal error starting audio: {}", e);
                    let _ = setup_tx.send(Err(e.to_string()));
                    return;
                }
            };

            // The stream captures for as long as this thread parks here.
            let _ = shutdown_rx.recv();

            eprintln!("[AUDIO-THREAD] Stopping stream and exiting...");
            if let Err(e) = stream.pause() {
                eprintln!("[AUDIO-THREAD] Error pausing stream: {}", e);
            }
            drop(stream);
            eprintln!("[AUDIO-THREAD] Audio thread finished");
        });

        match setup_rx.recv_timeout(AUDIO_SETUP_TIMEOUT) {
            Ok(Ok(sample_rate)) => {
                eprintln!("[MAIN] Audio capture running at {} Hz", sample_rate);
                self.sample_rate = sample_rate;
                self.frame_receiver = Some(frame_rx);
                self.audio_worker = Some(AudioWorker {
                    shutdown_tx,
                    thread_handle: Some(thread_handle),
                });
            }
            Ok(Err(e)) => {
                self.startup_error = Some(format!("Could not open the microphone: {}", e));
            }
            Err(_) => {
                self.startup_error =
                    Some("Timed out waiting for the audio device to start.".to_string());
            }
        }
    }

    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) {
        match message {
            Message::Tick => {
                let (Some(receiver), Some(tuner)) =
                    (self.frame_receiver.as_ref(), self.tuner.as_mut())
                else {
                    return;
                };

                // Snapshot read: drain whatever arrived since the last tick
                // and keep only the most recent window.
                let Some(frame) = receiver.try_iter().last() else {
                    return;
                };

                match tuner.process_frame(&frame, self.sample_rate) {
                    NoteEvent::Reset => self.display = NoteDisplay::Idle,
                    NoteEvent::NoChange => {}
                    NoteEvent::NoteChanged {
                        symbol,
                        deviation_hz,
                        tier,
                    } => {
                        eprintln!(
                            "[MAIN] Stable note: {} ({:.2} Hz off, {:?})",
                            symbol, deviation_hz, tier
                        );
                        self.display = NoteDisplay::Note {
                            symbol,
                            deviation_hz,
                            tier,
                        };
                    }
                }
            }
        }
    }

    /// Renders the note display: one large color-coded symbol plus a
    /// deviation readout, or the neutral placeholder while idle.
    fn view(&self) -> Element<'_, Message> {
        if let Some(error) = &self.startup_error {
            let content = column![
                text("Microphone unavailable").size(32),
                Space::with_height(10),
                text(error.clone()).size(16),
                text("Check input permissions and devices, then restart.").size(16),
            ]
            .align_x(Alignment::Center)
            .spacing(4);

            return container(content)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        }

        let (symbol, detail, color) = match &self.display {
            NoteDisplay::Idle => ("--".to_string(), String::new(), IDLE_COLOR),
            NoteDisplay::Note {
                symbol,
                deviation_hz,
                tier,
            } => {
                let color = match tier {
                    ConfidenceTier::Exact => EXACT_COLOR,
                    ConfidenceTier::Close => CLOSE_COLOR,
                    ConfidenceTier::Off => OFF_COLOR,
                };
                (
                    symbol.to_uppercase(),
                    format!("{:.2} Hz off", deviation_hz),
                    color,
                )
            }
        };

        let content = column![
            text("Sixstring").size(28),
            Space::with_height(40),
            text(symbol).size(120).color(color),
            text(detail).size(20),
        ]
        .align_x(Alignment::Center)
        .spacing(10);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Creates the ~60 FPS timer subscription that drives the tuner loop.
    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(TICK_INTERVAL).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl Drop for TunerApp {
    fn drop(&mut self) {
        if let Some(mut worker) = self.audio_worker.take() {
            eprintln!("[MAIN] Shutting down audio worker...");
            let _ = worker.shutdown_tx.send(());
            if let Some(handle) = worker.thread_handle.take() {
                let _ = handle.join();
            }
        }
    }
}
