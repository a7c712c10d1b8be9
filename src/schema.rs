//! The two schema variants. Both share the tweet/user surface and the
//! mutation root; the movies variant adds the catalog passthrough fields.

/// Tweet feed schema.
pub mod tweets {
    use juniper::{graphql_object, EmptySubscription, ID};

    use crate::context::Context;
    use crate::types::{Tweet, User};

    pub struct Query;

    #[graphql_object(context = Context)]
    impl Query {
        /// get all user list
        fn all_users(context: &Context) -> Vec<User> {
            context.store.list_users()
        }

        /// get all tweet list
        fn all_tweets(context: &Context) -> Vec<Tweet> {
            context.store.list_tweets()
        }

        /// get a single tweet
        fn tweet(context: &Context, id: ID) -> Option<Tweet> {
            context.store.find_tweet_by_id(&id)
        }
    }

    pub struct Mutation;

    #[graphql_object(context = Context)]
    impl Mutation {
        /// post a single tweet and returns a newly uploaded tweet
        fn post_tweet(context: &Context, text: String, user_id: ID) -> Tweet {
            let tweet = Tweet {
                id: context.store.next_tweet_id(),
                text,
                user_id: user_id.to_string(),
            };
            context.store.append_tweet(tweet.clone());
            tweet
        }

        /// delete a single tweet and returns the result of operation
        fn delete_tweet(context: &Context, id: ID) -> bool {
            context.store.remove_tweets_by_id(&id)
        }
    }

    pub type Schema = juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

    pub fn schema() -> Schema {
        Schema::new(Query, Mutation, EmptySubscription::new())
    }
}

/// Tweet feed schema plus the movie catalog passthrough.
pub mod movies {
    use juniper::{graphql_object, EmptySubscription, ID};

    use super::tweets::Mutation;
    use crate::context::Context;
    use crate::types::{Tweet, User};
    use crate::upstream::{Movie, UpstreamError};

    pub struct Query;

    #[graphql_object(context = Context)]
    impl Query {
        /// get all user list
        fn all_users(context: &Context) -> Vec<User> {
            context.store.list_users()
        }

        /// get all tweet list
        fn all_tweets(context: &Context) -> Vec<Tweet> {
            context.store.list_tweets()
        }

        /// get a single tweet
        fn tweet(context: &Context, id: ID) -> Option<Tweet> {
            context.store.find_tweet_by_id(&id)
        }

        /// get all movies from the catalog
        async fn all_movies(context: &Context) -> Result<Vec<Movie>, UpstreamError> {
            context.movies.list_movies().await
        }

        /// get a single movie by its catalog id
        async fn movie(context: &Context, id: String) -> Result<Option<Movie>, UpstreamError> {
            context.movies.movie_details(&id).await
        }
    }

    pub type Schema = juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

    pub fn schema() -> Schema {
        Schema::new(Query, Mutation, EmptySubscription::new())
    }
}
