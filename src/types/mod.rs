pub mod category;
mod expense;
mod user;

pub use expense::{Defaults, Expense, ExpenseDraft, DATE_FORMAT};
pub use user::User;
