mod child_detail;
mod home;
mod login;

pub use child_detail::ChildDetail;
pub use home::HomeView;
pub use login::LoginView;
