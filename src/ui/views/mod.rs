pub mod board;
pub mod home;
pub mod projects;
pub mod search;

pub use board::BoardView;
pub use home::HomeView;
pub use projects::ProjectListView;
pub use search::SearchView;
