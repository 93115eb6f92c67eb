//! Per-browser-session state, injected into every render pass.

use crate::analytics::device::DeviceClass;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Visit already counted for this session. Set once, never cleared.
    pub tracked: bool,
    /// Committed layout choice. `None` until a user agent has been seen; a pass without one
    /// renders the desktop layout and leaves detection to the next request.
    pub mobile_view: Option<bool>,
    /// Raw ticker of the focus item shown in the detail panel.
    pub focus_selected: Option<String>,
}

impl SessionState {
    /// Latch the tracked flag. Returns `true` only for the call that flipped it.
    pub fn mark_tracked(&mut self) -> bool {
        !std::mem::replace(&mut self.tracked, true)
    }

    /// Commit the layout from a detection result; undetected leaves the state untouched.
    pub fn observe_device(&mut self, device: Option<DeviceClass>) {
        if self.mobile_view.is_none() {
            if let Some(device) = device {
                self.mobile_view = Some(device == DeviceClass::Mobile);
            }
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.mobile_view.unwrap_or(false)
    }
}
