use sea_orm::entity::prelude::*;

pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 100;
pub const BUDGET_MIN: i32 = 1;
pub const DEFAULT_BUDGET: i32 = 1_000_000;
pub const NAME_MAX_LEN: usize = 40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum Currency {
    #[sea_orm(string_value = "EUR")]
    Eur,
    #[sea_orm(string_value = "USD")]
    Usd,
    #[default]
    #[sea_orm(string_value = "RUB")]
    Rub,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Usd, Currency::Rub];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Rub => "RUB",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Currency::Eur => "Euro",
            Currency::Usd => "Dollar",
            Currency::Rub => "Rubbles",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub rating: i32,
    pub year: Option<i32>,
    pub budget: i32,
    pub currency: Currency,
    pub slug: String,
    pub director_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::director::Entity",
        from = "Column::DirectorId",
        to = "super::director::Column::Id",
        on_delete = "Cascade"
    )]
    Director,
}

impl Related<super::director::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Director.def()
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Actor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Movie.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let sea_orm::ActiveValue::Set(rating) | sea_orm::ActiveValue::Unchanged(rating) =
            self.rating
        {
            if !rating_in_range(rating) {
                return Err(DbErr::Custom(format!(
                    "rating {rating} outside {RATING_MIN}..={RATING_MAX}"
                )));
            }
        }
        if let sea_orm::ActiveValue::Set(budget) | sea_orm::ActiveValue::Unchanged(budget) =
            self.budget
        {
            if budget < BUDGET_MIN {
                return Err(DbErr::Custom(format!("budget {budget} below {BUDGET_MIN}")));
            }
        }
        Ok(self)
    }
}

pub fn rating_in_range(rating: i32) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&rating)
}

impl Model {
    pub fn label(&self) -> String {
        format!("{} - {}%", self.name, self.rating)
    }

    pub fn url(&self) -> String {
        format!("/movie/{}", self.slug)
    }
}
