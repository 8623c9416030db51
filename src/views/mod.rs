//! Page controllers. Each one fetches rows scoped to the user it was
//! built for, keeps them in a [`state::ViewState`] and renders a JSON
//! view model.

pub mod attendance;
pub mod dashboard;
pub mod payroll;
pub mod profile;
pub mod state;
pub mod tasks;
#[cfg(test)]
pub mod testing;
