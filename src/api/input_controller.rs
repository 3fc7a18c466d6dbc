use crate::core::ScreenPoint;
use crate::host::ChartHost;
use crate::interaction::KeyCode;

use super::OverlayEngine;

/// Raw input entry points. Coordinates are pane pixels.
///
/// Every call runs the gesture step synchronously and then notifies
/// subscribers of whatever it produced.
impl<H: ChartHost> OverlayEngine<H> {
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.interact(|manager, ctx| manager.pointer_down(ScreenPoint::new(x, y), ctx));
        self.dispatch_events();
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.interact(|manager, ctx| manager.pointer_move(ScreenPoint::new(x, y), ctx));
        self.dispatch_events();
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.interact(|manager, ctx| manager.pointer_up(ScreenPoint::new(x, y), ctx));
        self.dispatch_events();
    }

    pub fn double_click(&mut self, x: f64, y: f64) {
        self.interact(|manager, ctx| manager.double_click(ScreenPoint::new(x, y), ctx));
        self.dispatch_events();
    }

    pub fn pointer_leave(&mut self) {
        self.interact(|manager, ctx| manager.pointer_leave(ctx));
        self.dispatch_events();
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.interact(|manager, ctx| manager.key_down(key, ctx));
        self.dispatch_events();
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.interaction.key_up(key);
    }

    /// Mirrors the platform's modifier state when it is known out of band.
    pub fn set_shift_held(&mut self, held: bool) {
        self.interaction.set_shift(held);
    }

    /// Abandons the tool being created, removing it. Returns its id.
    pub fn cancel_creation(&mut self) -> Option<String> {
        let cancelled = self.interact(|manager, ctx| manager.cancel_creation(ctx));
        self.dispatch_events();
        cancelled
    }
}
