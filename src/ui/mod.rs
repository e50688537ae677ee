// UI module - GUI logic and event loop bridge
//
// This module contains:
// - EventLoopBridge: Coordinates between tokio async runtime and Slint event loop
// - GuiController: Wires the Slint window to the screening session
// - view_model: Display-ready data (percent labels, bands, headlines) derived from state

pub mod bridge;
pub mod controller;
pub mod view_model;

pub use bridge::EventLoopBridge;
pub use controller::GuiController;
pub use view_model::{ConnectivityView, FileCardView, ResultsView, UploadingView};
