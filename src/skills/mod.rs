//! Chat skills reachable from the main menu.

pub mod country;
pub mod mood;
pub mod product;

use async_trait::async_trait;

use crate::error::Result;
use crate::events::DisplayEvent;

pub use country::CountrySkill;
pub use mood::MoodSkill;
pub use product::ProductSkill;

#[async_trait]
pub trait Skill: Send + Sync {
    /// Shown when the skill is picked from the menu
    fn intro(&self) -> Vec<DisplayEvent>;

    /// Closes every turn of this skill
    fn ready(&self) -> DisplayEvent;

    /// Handle one user message. An `Err` means nothing useful could be
    /// produced for the turn.
    async fn handle(&self, text: &str) -> Result<Vec<DisplayEvent>>;
}
