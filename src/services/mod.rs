// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aliases;
pub mod calendar;
pub mod dispatch;
pub mod hackathons;
pub mod normalize;
pub mod oracle;
pub mod schedule;

pub use calendar::{CalendarClient, GoogleCalendarClient};
pub use dispatch::{dispatch, ChatReply, ChatResult};
pub use oracle::{GeminiOracle, IntentOracle};
pub use schedule::{CalendarSync, OperationResult, RequestContext, ScheduleService};
