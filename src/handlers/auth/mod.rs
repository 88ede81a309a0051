// Session endpoints. Tokens travel in the JSON body, never in headers.

pub mod login;
pub mod logout;

pub use login::login as login_post;
pub use logout::logout as logout_post;
