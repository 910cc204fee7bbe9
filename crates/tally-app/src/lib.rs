// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod debounce;
pub mod edit;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod row;
pub mod sort;
pub mod state;
pub mod timestamp;
pub mod view;
pub mod views;

pub use controller::*;
pub use debounce::*;
pub use edit::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use row::*;
pub use sort::*;
pub use state::*;
pub use timestamp::*;
pub use view::*;
pub use views::*;
