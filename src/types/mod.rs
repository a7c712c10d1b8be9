mod tweet;
mod user;

pub use self::tweet::Tweet;
pub use self::user::User;
