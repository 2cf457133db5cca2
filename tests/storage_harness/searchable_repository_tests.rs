//! Macro-generated contract suite for `SearchableRepository` backends.
//!
//! The `searchable_repository_tests!` macro generates a test module that
//! validates a backend against the shared repository contract: CRUD,
//! filtering, multi-criteria sorting, pagination and edge cases. Every
//! backend must produce the same pages for the same requests.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use catalog::storage::InMemorySearchableRepository;
//!
//! searchable_repository_tests!(
//!     category: InMemorySearchableRepository::<Category>::new(),
//!     cast_member: InMemorySearchableRepository::<CastMember>::new(),
//! );
//! ```
//!
//! Both factory expressions are re-evaluated for each test, so each test
//! starts from an empty store. They may contain `.await`.

/// Generate the full `SearchableRepository` conformance test suite.
macro_rules! searchable_repository_tests {
    (category: $category:expr, cast_member: $cast_member:expr $(,)?) => {
        mod searchable_repository_contract_tests {
            use super::*;
            use catalog::catalog::{CastMemberFilter, CastMemberType, Category};
            use catalog::core::{EntityId, Repository, RepositoryError, SearchableRepository};
            use catalog::search::{SearchParams, SortCriterion};
            use serde_json::json;

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_find_by_id() {
                let repository = $category;
                let mut category = category_at("Movie", 0);
                category.change_description(Some("Feature films".to_string()));

                repository.insert(category.clone()).await.unwrap();

                let found = repository.find_by_id(&category.id).await.unwrap();
                assert_eq!(found, Some(category));
            }

            #[tokio::test]
            async fn test_find_by_id_missing() {
                let repository = $category;
                let found = repository.find_by_id(&EntityId::new()).await.unwrap();
                assert!(found.is_none());
            }

            #[tokio::test]
            async fn test_find_all_in_insertion_order() {
                let repository = $category;
                assert!(repository.find_all().await.unwrap().is_empty());

                repository
                    .bulk_insert(categories(&["b", "c", "a"]))
                    .await
                    .unwrap();

                let names: Vec<String> = repository
                    .find_all()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|c| c.name)
                    .collect();
                assert_eq!(names, vec!["b", "c", "a"]);
            }

            #[tokio::test]
            async fn test_update_existing() {
                let repository = $category;
                let mut category = category_at("Movie", 0);
                repository.insert(category.clone()).await.unwrap();

                category.change_name("Film").unwrap();
                category.deactivate();
                repository.update(category.clone()).await.unwrap();

                let found = repository.find_by_id(&category.id).await.unwrap().unwrap();
                assert_eq!(found.name, "Film");
                assert!(!found.is_active);
            }

            #[tokio::test]
            async fn test_update_missing() {
                let repository = $category;
                let err = repository.update(category_at("Ghost", 0)).await.unwrap_err();
                assert!(matches!(err, RepositoryError::NotFound { .. }));
                assert_eq!(err.error_code(), "NOT_FOUND");
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let repository = $category;
                let category = category_at("Movie", 0);
                repository.insert(category.clone()).await.unwrap();

                repository.delete(&category.id).await.unwrap();

                assert!(repository.find_by_id(&category.id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_missing() {
                let repository = $category;
                let err = repository.delete(&EntityId::new()).await.unwrap_err();
                assert!(matches!(err, RepositoryError::NotFound { .. }));
            }

            #[tokio::test]
            async fn test_sortable_fields() {
                let repository = $category;
                assert_eq!(repository.sortable_fields(), vec!["name", "created_at"]);
            }

            // ==================================================================
            // Search: defaults and pagination
            // ==================================================================

            #[tokio::test]
            async fn test_search_default_params() {
                let repository = $category;
                repository.bulk_insert(category_batch(16)).await.unwrap();

                let result = repository.search(&SearchParams::new()).await.unwrap();

                assert_eq!(result.items.len(), 15);
                assert_page(&result, 16, 1, 15, 2);
                // Default ordering is newest first
                assert_eq!(result.items[0].name, "Category 15");
                assert_eq!(result.items[14].name, "Category 1");
            }

            #[tokio::test]
            async fn test_search_second_page() {
                let repository = $category;
                repository.bulk_insert(category_batch(16)).await.unwrap();

                let params = SearchParams::from_value(&json!({"page": "2"})).unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(category_names(&result), vec!["Category 0"]);
                assert_page(&result, 16, 2, 15, 2);
            }

            #[tokio::test]
            async fn test_search_empty_store() {
                let repository = $category;
                let result = repository.search(&SearchParams::new()).await.unwrap();

                assert!(result.items.is_empty());
                assert_page(&result, 0, 1, 15, 1);
            }

            #[tokio::test]
            async fn test_search_page_past_the_end() {
                let repository = $category;
                repository.bulk_insert(category_batch(3)).await.unwrap();

                let params = SearchParams::builder().page(4).limit(2).build().unwrap();
                let result = repository.search(&params).await.unwrap();

                assert!(result.items.is_empty());
                assert_page(&result, 3, 4, 2, 2);
            }

            #[tokio::test]
            async fn test_search_coerces_raw_input() {
                let repository = $category;
                repository.bulk_insert(category_batch(5)).await.unwrap();

                let params = SearchParams::from_value(&json!({
                    "page": "0",
                    "per_page": "2.5",
                    "sort_criteria": {"field": "name", "direction": "sideways"},
                    "filter": ""
                }))
                .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(
                    category_names(&result),
                    vec![
                        "Category 0",
                        "Category 1",
                        "Category 2",
                        "Category 3",
                        "Category 4"
                    ]
                );
                assert_page(&result, 5, 1, 15, 1);
            }

            // ==================================================================
            // Search: filtering
            // ==================================================================

            #[tokio::test]
            async fn test_search_filter_sort_paginate() {
                let repository = $category;
                repository
                    .bulk_insert(categories(&["Jane", "Jack", "Jill", "John", "Doe"]))
                    .await
                    .unwrap();

                let params = SearchParams::builder()
                    .page(2)
                    .limit(2)
                    .sort(SortCriterion::asc("name"))
                    .filter("j")
                    .build()
                    .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(category_names(&result), vec!["Jill", "John"]);
                assert_page(&result, 4, 2, 2, 2);
            }

            #[tokio::test]
            async fn test_search_filter_is_case_insensitive() {
                let repository = $category;
                repository
                    .bulk_insert(categories(&["Jane", "Jack", "Doe"]))
                    .await
                    .unwrap();

                let params = SearchParams::builder()
                    .sort(SortCriterion::asc("name"))
                    .filter("JA")
                    .build()
                    .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(category_names(&result), vec!["Jack", "Jane"]);
                assert_eq!(result.total, 2);

                repository
                    .bulk_insert(categories(&["Éclair", "Ärger", "ÇA", "Straße"]))
                    .await
                    .unwrap();
                for (filter, expected) in [
                    ("éclair", "Éclair"),
                    ("eclair", ""),
                    ("ÄRG", "Ärger"),
                    ("ça", "ÇA"),
                    ("STRASSE", ""),
                    ("straße", "Straße"),
                ] {
                    let params = SearchParams::builder().filter(filter).build().unwrap();
                    let result = repository.search(&params).await.unwrap();
                    let expected: Vec<&str> = if expected.is_empty() {
                        vec![]
                    } else {
                        vec![expected]
                    };
                    assert_eq!(category_names(&result), expected, "filter {:?}", filter);
                }
            }

            #[tokio::test]
            async fn test_search_filter_follows_renamed_entities() {
                let repository = $category;
                let mut category = category_at("Ópera", 0);
                repository.insert(category.clone()).await.unwrap();

                category.change_name("Ébano").unwrap();
                repository.update(category).await.unwrap();

                let stale = SearchParams::builder().filter("ópera").build().unwrap();
                assert_eq!(repository.search(&stale).await.unwrap().total, 0);

                let renamed = SearchParams::builder().filter("ÉBANO").build().unwrap();
                let result = repository.search(&renamed).await.unwrap();
                assert_eq!(category_names(&result), vec!["Ébano"]);
            }

            #[tokio::test]
            async fn test_search_filter_no_match() {
                let repository = $category;
                repository.bulk_insert(category_batch(3)).await.unwrap();

                let params = SearchParams::builder().filter("zzz").build().unwrap();
                let result = repository.search(&params).await.unwrap();

                assert!(result.items.is_empty());
                assert_page(&result, 0, 1, 15, 1);
            }

            #[tokio::test]
            async fn test_search_filter_matches_wildcards_literally() {
                let repository = $category;
                repository
                    .bulk_insert(categories(&["100% Drama", "100 Drama", "a_b", "axb"]))
                    .await
                    .unwrap();

                let params = SearchParams::builder().filter("%").build().unwrap();
                let result = repository.search(&params).await.unwrap();
                assert_eq!(category_names(&result), vec!["100% Drama"]);

                let params = SearchParams::builder().filter("_").build().unwrap();
                let result = repository.search(&params).await.unwrap();
                assert_eq!(category_names(&result), vec!["a_b"]);
            }

            // ==================================================================
            // Search: sorting
            // ==================================================================

            #[tokio::test]
            async fn test_search_sort_descending() {
                let repository = $category;
                repository
                    .bulk_insert(categories(&["b", "c", "a"]))
                    .await
                    .unwrap();

                let params = SearchParams::from_value(&json!({
                    "sort_criteria": {"field": "name", "direction": "DESC"}
                }))
                .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(category_names(&result), vec!["c", "b", "a"]);
            }

            #[tokio::test]
            async fn test_search_sort_is_case_sensitive() {
                let repository = $category;
                repository
                    .bulk_insert(categories(&["b", "A", "a", "B"]))
                    .await
                    .unwrap();

                let params = SearchParams::builder()
                    .sort(SortCriterion::asc("name"))
                    .build()
                    .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(category_names(&result), vec!["A", "B", "a", "b"]);
            }

            #[tokio::test]
            async fn test_search_multiple_criteria() {
                let repository = $category;
                repository
                    .bulk_insert(vec![
                        category_at("John", 1),
                        category_at("Jane", 0),
                        category_at("John", 0),
                        category_at("Doe", 2),
                    ])
                    .await
                    .unwrap();

                let params = SearchParams::from_value(&json!({
                    "sort_criteria": [
                        {"field": "name", "direction": "asc"},
                        {"field": "created_at", "direction": "desc"}
                    ]
                }))
                .unwrap();
                let result = repository.search(&params).await.unwrap();

                let keys: Vec<(String, i64)> = result
                    .items
                    .iter()
                    .map(|c| (c.name.clone(), (c.created_at - base_time()).num_seconds()))
                    .collect();
                assert_eq!(
                    keys,
                    vec![
                        ("Doe".to_string(), 2),
                        ("Jane".to_string(), 0),
                        ("John".to_string(), 1),
                        ("John".to_string(), 0),
                    ]
                );
            }

            #[tokio::test]
            async fn test_search_ignores_unknown_sort_fields() {
                let repository = $category;
                repository
                    .bulk_insert(categories(&["b", "a"]))
                    .await
                    .unwrap();

                let params = SearchParams::from_value(&json!({
                    "sort_criteria": [
                        {"field": "name; DROP TABLE entities"},
                        {"field": "name", "direction": "asc"}
                    ]
                }))
                .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(category_names(&result), vec!["a", "b"]);
                assert_eq!(repository.find_all().await.unwrap().len(), 2);
            }

            // ==================================================================
            // Search: typed filters
            // ==================================================================

            #[tokio::test]
            async fn test_search_cast_members_by_type() {
                let repository = $cast_member;
                repository
                    .bulk_insert(vec![
                        cast_member_at("Ann", CastMemberType::Actor, 0),
                        cast_member_at("Bob", CastMemberType::Director, 1),
                        cast_member_at("Cid", CastMemberType::Actor, 2),
                        cast_member_at("Ada", CastMemberType::Director, 3),
                    ])
                    .await
                    .unwrap();

                let params = SearchParams::from_value(&json!({
                    "filter": {"type": "1"},
                    "sort_criteria": {"field": "name"}
                }))
                .unwrap();
                let result = repository.search(&params).await.unwrap();

                assert_eq!(cast_member_names(&result), vec!["Ada", "Bob"]);
                assert_eq!(result.total, 2);
            }

            #[tokio::test]
            async fn test_search_cast_members_by_name_and_type() {
                let repository = $cast_member;
                repository
                    .bulk_insert(vec![
                        cast_member_at("Anna", CastMemberType::Actor, 0),
                        cast_member_at("Hanna", CastMemberType::Director, 1),
                        cast_member_at("Joanna", CastMemberType::Actor, 2),
                    ])
                    .await
                    .unwrap();

                let filter =
                    CastMemberFilter::new(Some("ANNA".to_string()), Some(CastMemberType::Actor));
                let params = SearchParams::builder()
                    .filter_with(Some(filter))
                    .build()
                    .unwrap();
                let result = repository.search(&params).await.unwrap();

                // Default ordering is newest first
                assert_eq!(cast_member_names(&result), vec!["Joanna", "Anna"]);
                assert_page(&result, 2, 1, 15, 1);
            }

            #[tokio::test]
            async fn test_cast_member_round_trip() {
                let repository = $cast_member;
                let member = cast_member_at("Ann", CastMemberType::Director, 0);
                repository.insert(member.clone()).await.unwrap();

                let found = repository.find_by_id(&member.id).await.unwrap();
                assert_eq!(found, Some(member));
            }

            #[tokio::test]
            async fn test_entity_types_are_isolated() {
                let categories_repository = $category;
                let members_repository = $cast_member;
                categories_repository
                    .insert(category_at("Ann", 0))
                    .await
                    .unwrap();
                members_repository
                    .insert(cast_member_at("Ann", CastMemberType::Actor, 0))
                    .await
                    .unwrap();

                let result = categories_repository
                    .search(&SearchParams::<String>::new())
                    .await
                    .unwrap();
                assert_eq!(result.total, 1);

                let result = members_repository.search(&SearchParams::new()).await.unwrap();
                assert_eq!(result.total, 1);
            }

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let repository = std::sync::Arc::new($category);
                let mut handles = Vec::new();

                for i in 0..10 {
                    let repository = repository.clone();
                    handles.push(tokio::spawn(async move {
                        let category: Category = category_at(&format!("Concurrent {}", i), i);
                        repository.insert(category).await.unwrap();
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }

                let result = repository
                    .search(&SearchParams::builder().limit(50).build().unwrap())
                    .await
                    .unwrap();
                assert_eq!(result.total, 10);
                assert_eq!(result.items.len(), 10);
            }
        }
    };
}
