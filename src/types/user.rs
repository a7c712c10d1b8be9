use juniper::{graphql_object, ID};

///
/// GraphQL type for a user
///
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// unique identification of user
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

#[graphql_object]
impl User {
    fn id(&self) -> ID {
        ID::new(self.id.clone())
    }

    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    /// first name and last name joined by a single space
    fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_both_parts() {
        let user = User {
            id: "2".into(),
            first_name: "seven".into(),
            last_name: "stone".into(),
        };
        assert_eq!(user.full_name(), "seven stone");
    }
}
