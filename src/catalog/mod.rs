//! Catalog aggregates and their list use cases

pub mod cast_member;
pub mod category;
pub mod list;

pub use cast_member::{CastMember, CastMemberFilter, CastMemberType};
pub use category::Category;
pub use list::{
    CastMemberOutput, CategoryOutput, ListCastMembers, ListCategories, ListError, ListInput,
    ListUseCase, PaginationOutput,
};
