use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CorporateName {
    #[schema(example = "Acme")]
    pub corporate_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct FactoryName {
    #[schema(example = "Plant A")]
    pub factory_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryMonth {
    #[schema(example = "2024-01")]
    pub month: Option<String>,
}
