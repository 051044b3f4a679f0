// Assessment scoring: question model, the pure scoring engine, tiers and
// feedback, the static catalog, and session-scoped attempts.

pub mod catalog;
pub mod feedback;
pub mod handlers;
pub mod models;
pub mod scoring;
pub mod session;
pub mod tiers;
