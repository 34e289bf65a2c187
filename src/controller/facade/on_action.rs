use crate::controller::Controller;
use crate::widget::Action;

impl Controller {
    pub(super) async fn on_action(&self, from_login: &str, action: Action) {
        use Action::*;

        match action {
            SpectateSlot { slot } => match self.widget.spectate(from_login, slot).await {
                Ok(target) => log::debug!("{} now spectates {}", from_login, target),
                Err(err) => log::warn!("rejected spectate request of {}: {}", from_login, err),
            },
        }
    }
}
