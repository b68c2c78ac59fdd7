//! iqscore-report: Report generation for scored sessions.

pub mod html;
