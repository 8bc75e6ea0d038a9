use sea_orm::entity::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Gender {
    #[default]
    #[sea_orm(string_value = "M")]
    Male,
    #[sea_orm(string_value = "F")]
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "actor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub dressing_room_id: Option<i32>,
    pub gender: Gender,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dressing_room::Entity",
        from = "Column::DressingRoomId",
        to = "super::dressing_room::Column::Id",
        on_delete = "SetNull"
    )]
    DressingRoom,
}

impl Related<super::dressing_room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DressingRoom.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Movie.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Actor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn label(&self) -> String {
        match self.gender {
            Gender::Male => format!("Actor {} {}", self.first_name, self.last_name),
            Gender::Female => format!("Actress {} {}", self.first_name, self.last_name),
        }
    }

    pub fn url(&self) -> String {
        format!("/actors/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(gender: Gender) -> Model {
        Model {
            id: 3,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            dressing_room_id: None,
            gender,
        }
    }

    #[test]
    fn label_follows_gender() {
        assert_eq!(actor(Gender::Male).label(), "Actor Jane Doe");
        assert_eq!(actor(Gender::Female).label(), "Actress Jane Doe");
    }

    #[test]
    fn url_uses_numeric_id() {
        assert_eq!(actor(Gender::Male).url(), "/actors/3");
    }
}
