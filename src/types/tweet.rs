use juniper::{graphql_object, FieldResult, ID};

use crate::context::Context;
use crate::types::User;

///
/// GraphQL type for a tweet
///
/// `user_id` is a plain foreign key into the user collection; nothing
/// enforces that it points at an existing user. The schema only exposes the
/// resolved `author` object.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Tweet {
    /// unique identification of tweet
    pub id: String,
    pub text: String,
    pub user_id: String,
}

#[graphql_object(context = Context)]
impl Tweet {
    fn id(&self) -> ID {
        ID::new(self.id.clone())
    }

    fn text(&self) -> &str {
        &self.text
    }

    /// author of tweet
    fn author(&self, context: &Context) -> FieldResult<User> {
        context
            .store
            .find_user_by_id(&self.user_id)
            .ok_or_else(|| format!("no author found for user id {}", self.user_id).into())
    }
}
