//! End-to-end tests of the pipeline operations against the in-memory gateway,
//! a scripted model and a mock page fetcher.

use std::sync::Arc;

use larder_core::{
    BlockClusterDraft, BlockPlanDraft, ClusterRecipeRef, ErrorKind, FakeProvider, IngredientDraft,
    LlmError, MemoryGateway, MockClient, Pipeline, RecipeDraft, ShoppingListItemDraft, UserId,
};

const LINK: &str = "https://cooking.example/daal";

struct Harness {
    llm: Arc<FakeProvider>,
    gateway: Arc<MemoryGateway>,
    pipeline: Pipeline,
}

fn harness_with(llm: FakeProvider, http: MockClient, gateway: MemoryGateway) -> Harness {
    let llm = Arc::new(llm);
    let gateway = Arc::new(gateway);
    let pipeline = Pipeline::new(llm.clone(), Arc::new(http), gateway.clone());
    Harness {
        llm,
        gateway,
        pipeline,
    }
}

fn harness(llm: FakeProvider) -> Harness {
    harness_with(llm, MockClient::new(), MemoryGateway::new())
}

fn alice() -> UserId {
    UserId::new("alice")
}

fn bob() -> UserId {
    UserId::new("bob")
}

fn ingredient(name: &str, quantity: &str) -> IngredientDraft {
    IngredientDraft {
        name: name.to_string(),
        quantity: quantity.to_string(),
        is_pantry: false,
    }
}

fn draft(link: &str, ingredients: Vec<IngredientDraft>) -> RecipeDraft {
    RecipeDraft {
        name: "Daal".to_string(),
        description: "Weeknight lentils".to_string(),
        is_fast: true,
        is_suitable_for_fridge: true,
        link: link.to_string(),
        ingredients,
    }
}

fn block(name: &str, recipes: Vec<ClusterRecipeRef>) -> BlockClusterDraft {
    BlockClusterDraft {
        name: name.to_string(),
        similarity: 0.7,
        recipes,
        common_ingredients: vec![],
    }
}

fn by_id(id: i32, name: &str) -> ClusterRecipeRef {
    ClusterRecipeRef {
        id: Some(id),
        name: name.to_string(),
    }
}

fn item(name: &str, amount: &str) -> ShoppingListItemDraft {
    ShoppingListItemDraft {
        name: name.to_string(),
        amount: amount.to_string(),
    }
}

// ---------------------------------------------------------------------------
// import_recipe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_sends_main_region_and_dedups_ingredients() {
    let html = "<html><head><script>tracking()</script></head><body><nav>Home</nav><main><h1>Daal</h1></main><footer/></body></html>";
    let llm = FakeProvider::with_response(
        "<main><h1>Daal</h1></main>",
        r#"{
            "name": "Daal",
            "description": "Creamy lentils",
            "is_fast": true,
            "is_suitable_for_fridge": true,
            "ingredients": [
                {"name": "Salt", "quantity": "1 tsp", "is_pantry": true},
                {"name": "Egg", "quantity": "2"},
                {"name": "Salt", "quantity": "2 tsp", "is_pantry": true}
            ]
        }"#,
    );
    let h = harness_with(
        llm,
        MockClient::new().with_html(LINK, html),
        MemoryGateway::new(),
    );

    let result = h.pipeline.import_recipe(&alice(), LINK).await;

    assert!(result.is_success(), "{result:?}");
    let draft = result.data.unwrap();
    assert_eq!(draft.link, LINK);
    let names: Vec<&str> = draft.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Salt", "Egg"]);
    assert_eq!(draft.ingredients[0].quantity, "1 tsp");

    let sent = h.llm.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].messages[1].content,
        "The HTML you are to analyse is: <main><h1>Daal</h1></main>"
    );
    assert_eq!(result.message.unwrap().title, "Recipe imported");

    // Importing never persists anything.
    assert_eq!(h.gateway.recipe_count(&alice()), 0);
}

#[tokio::test]
async fn duplicate_link_never_reaches_the_model() {
    let h = harness_with(
        FakeProvider::default(),
        MockClient::new().with_html(LINK, "<body>Daal</body>"),
        MemoryGateway::new(),
    );
    h.gateway.seed_recipe(&alice(), "Daal", LINK, &[]);

    let result = h.pipeline.import_recipe(&alice(), LINK).await;

    assert!(!result.is_success());
    assert_eq!(result.error_kind, Some(ErrorKind::DuplicateImport));
    assert_eq!(
        result.message.unwrap().description,
        "The recipe has already been imported."
    );
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn same_link_from_another_user_is_not_a_duplicate() {
    let h = harness_with(
        FakeProvider::new().with_default_response(r#"{"name": "Daal"}"#),
        MockClient::new().with_html(LINK, "<body>Daal</body>"),
        MemoryGateway::new(),
    );
    h.gateway.seed_recipe(&bob(), "Daal", LINK, &[]);

    let result = h.pipeline.import_recipe(&alice(), LINK).await;

    assert!(result.is_success(), "{result:?}");
    assert_eq!(h.llm.call_count(), 1);
}

#[tokio::test]
async fn invalid_link_is_a_field_error() {
    let h = harness(FakeProvider::default());

    let result = h.pipeline.import_recipe(&alice(), "not a url").await;

    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert_eq!(result.errors[0].field_name, "link");
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn unreachable_page_is_fetch_failed() {
    let h = harness_with(
        FakeProvider::default(),
        MockClient::new().with_status(LINK, 404),
        MemoryGateway::new(),
    );

    let result = h.pipeline.import_recipe(&alice(), LINK).await;

    assert_eq!(result.error_kind, Some(ErrorKind::FetchFailed));
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn non_json_reply_is_malformed() {
    let h = harness_with(
        FakeProvider::new().with_default_response("not json{"),
        MockClient::new().with_html(LINK, "<body>Daal</body>"),
        MemoryGateway::new(),
    );

    let result = h.pipeline.import_recipe(&alice(), LINK).await;

    assert_eq!(result.error_kind, Some(ErrorKind::MalformedResponse));
    assert_eq!(result.message.unwrap().title, "Recipe import failed");
    assert!(result.data.is_none());
}

#[tokio::test]
async fn oversized_page_is_input_too_large() {
    let h = harness_with(
        FakeProvider::new().add_error("analyse", LlmError::InputTooLarge("128k".to_string())),
        MockClient::new().with_html(LINK, "<body>very long page</body>"),
        MemoryGateway::new(),
    );

    let result = h.pipeline.import_recipe(&alice(), LINK).await;

    assert_eq!(result.error_kind, Some(ErrorKind::InputTooLarge));
    assert!(result
        .message
        .unwrap()
        .description
        .contains("Try another website"));
}

// ---------------------------------------------------------------------------
// complete_recipe_import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completing_an_import_reuses_existing_ingredients() {
    let h = harness(FakeProvider::default());
    h.gateway.seed_recipe(
        &alice(),
        "Garlic Bread",
        "https://cooking.example/bread",
        &[("Garlic", false, "3 cloves")],
    );
    assert_eq!(h.gateway.ingredient_count(&alice()), 1);

    let result = h
        .pipeline
        .complete_recipe_import(
            &alice(),
            draft(
                LINK,
                vec![
                    ingredient("garlic", "2 cloves"),
                    ingredient("Red Lentils", "200g"),
                    ingredient("red lentils", "100g"),
                ],
            ),
        )
        .await;

    assert!(result.is_success(), "{result:?}");
    let recipe_id = result.data.unwrap().recipe_id;
    assert_eq!(h.gateway.ingredient_count(&alice()), 2);
    assert_eq!(
        h.gateway.recipe_ingredients(&alice(), recipe_id),
        vec![
            ("Garlic".to_string(), "2 cloves".to_string()),
            ("Red Lentils".to_string(), "200g".to_string()),
        ]
    );

    let stored = h.gateway.recipe(&alice(), recipe_id).unwrap();
    assert_eq!(stored.link, LINK);
    assert!(stored.is_fast);
    assert_eq!(result.message.unwrap().title, "Recipe created");
}

#[tokio::test]
async fn other_users_ingredients_are_never_reused() {
    let h = harness(FakeProvider::default());
    h.gateway
        .seed_recipe(&bob(), "Bread", "https://b.example/", &[("Garlic", false, "1")]);

    let result = h
        .pipeline
        .complete_recipe_import(&alice(), draft(LINK, vec![ingredient("Garlic", "2")]))
        .await;

    assert!(result.is_success());
    assert_eq!(h.gateway.ingredient_count(&alice()), 1);
    assert_eq!(h.gateway.ingredient_count(&bob()), 1);
}

#[tokio::test]
async fn completing_a_duplicate_link_is_rejected() {
    let h = harness(FakeProvider::default());
    h.gateway.seed_recipe(&alice(), "Daal", LINK, &[]);

    let result = h
        .pipeline
        .complete_recipe_import(&alice(), draft(LINK, vec![]))
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::DuplicateImport));
    assert_eq!(h.gateway.recipe_count(&alice()), 1);
}

#[tokio::test]
async fn invalid_draft_reports_field_paths() {
    let h = harness(FakeProvider::default());
    let mut bad = draft(LINK, vec![ingredient("", "1")]);
    bad.name = String::new();

    let result = h.pipeline.complete_recipe_import(&alice(), bad).await;

    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    let fields: Vec<&str> = result.errors.iter().map(|e| e.field_name.as_str()).collect();
    assert_eq!(fields, vec!["name", "ingredients.0.name"]);
    assert_eq!(h.gateway.recipe_count(&alice()), 0);
}

#[tokio::test]
async fn failed_commit_writes_nothing() {
    let h = harness_with(
        FakeProvider::default(),
        MockClient::new(),
        MemoryGateway::failing_commits(),
    );

    let result = h
        .pipeline
        .complete_recipe_import(&alice(), draft(LINK, vec![ingredient("Lentils", "1 cup")]))
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::PersistenceFailure));
    assert_eq!(h.gateway.recipe_count(&alice()), 0);
    assert_eq!(h.gateway.ingredient_count(&alice()), 0);
}

// ---------------------------------------------------------------------------
// generate_blocks / complete_blocks_import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_recipes_means_no_model_call() {
    let h = harness(FakeProvider::default());

    let result = h.pipeline.generate_blocks(&alice()).await;

    assert_eq!(
        result.error_kind,
        Some(ErrorKind::InsufficientGroupingMaterial)
    );
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn soft_error_0001_is_insufficient_grouping_material() {
    let h = harness(FakeProvider::new().with_default_response(
        r#"{"error": {"code": "0001", "message": "Unable to create the requested number of groups."}}"#,
    ));
    h.gateway
        .seed_recipe(&alice(), "Daal", LINK, &[("Lentils", false, "200g")]);

    let result = h.pipeline.generate_blocks(&alice()).await;

    assert_eq!(
        result.error_kind,
        Some(ErrorKind::InsufficientGroupingMaterial)
    );
    assert!(result
        .message
        .unwrap()
        .description
        .contains("couldn't create enough groups"));
}

#[tokio::test]
async fn clustering_prompt_lists_only_own_non_pantry_ingredients() {
    let h = harness(FakeProvider::new().with_default_response(r#"{"blocks": [], "unused": []}"#));
    let daal = h.gateway.seed_recipe(
        &alice(),
        "Daal",
        LINK,
        &[("Lentils", false, "200g"), ("Salt", true, "1 tsp")],
    );
    h.gateway
        .seed_recipe(&bob(), "Secret Stew", "https://b.example/", &[("Beef", false, "1kg")]);

    let result = h.pipeline.generate_blocks(&alice()).await;

    assert!(result.is_success(), "{result:?}");
    let prompt = &h.llm.requests()[0].messages[1].content;
    assert_eq!(
        prompt,
        &format!("The recipes you are to process are:\r\n- Daal [{daal}]: (Lentils)")
    );
}

#[tokio::test]
async fn committing_blocks_links_only_the_users_recipes() {
    let h = harness(FakeProvider::default());
    let daal = h.gateway.seed_recipe(&alice(), "Daal", LINK, &[]);
    let korma = h
        .gateway
        .seed_recipe(&alice(), "Korma", "https://a.example/korma", &[]);
    let stew = h
        .gateway
        .seed_recipe(&bob(), "Stew", "https://b.example/stew", &[]);

    let plan = BlockPlanDraft {
        blocks: vec![
            block(
                "Curries",
                vec![
                    by_id(daal, "Daal"),
                    ClusterRecipeRef {
                        id: None,
                        name: "Korma".to_string(),
                    },
                    by_id(daal, "Daal"),
                ],
            ),
            block("Stolen", vec![by_id(stew, "Stew")]),
        ],
        unused: vec![],
    };

    let result = h.pipeline.complete_blocks_import(&alice(), plan).await;

    assert!(result.is_success(), "{result:?}");
    let ids = result.data.unwrap().block_ids;
    assert_eq!(ids.len(), 2);
    assert_eq!(h.gateway.linked_recipes(&alice(), ids[0]), vec![daal, korma]);
    assert!(h.gateway.linked_recipes(&alice(), ids[1]).is_empty());
    assert_eq!(h.gateway.block_name(&alice(), ids[0]).as_deref(), Some("Curries"));
    assert_eq!(h.gateway.block_name(&bob(), ids[0]), None);
    assert_eq!(result.message.unwrap().title, "Plans created");
}

#[tokio::test]
async fn empty_block_plan_is_rejected() {
    let h = harness(FakeProvider::default());

    let result = h
        .pipeline
        .complete_blocks_import(&alice(), BlockPlanDraft::default())
        .await;

    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert_eq!(result.errors[0].field_name, "blocks");
}

// ---------------------------------------------------------------------------
// shopping lists
// ---------------------------------------------------------------------------

fn seeded_block(h: &Harness) -> i32 {
    let daal = h.gateway.seed_recipe(
        &alice(),
        "Daal",
        LINK,
        &[("Tomato", false, "2"), ("Red Onion", false, "1")],
    );
    let soup = h.gateway.seed_recipe(
        &alice(),
        "Soup",
        "https://a.example/soup",
        &[("Tomatoes", false, "400g")],
    );
    h.gateway.seed_block(&alice(), "Week 1", &[daal, soup])
}

#[tokio::test]
async fn shopping_list_is_generated_and_stored() {
    let h = harness(FakeProvider::with_response(
        "items you are to process",
        r#"[{"name": "Tomatoes", "amount": "2 + 400g"}, {"name": "Red Onion", "amount": "1"}]"#,
    ));
    let block_id = seeded_block(&h);

    let result = h.pipeline.generate_shopping_list(&alice(), block_id).await;

    assert!(result.is_success(), "{result:?}");
    let list = result.data.unwrap();
    assert!(list.exists);
    assert_eq!(list.list.as_ref().unwrap().len(), 2);

    let prompt = &h.llm.requests()[0].messages[1].content;
    assert!(prompt.starts_with("The items you are to process are:\r\n- "));
    assert!(prompt.contains("Tomatoes"));

    let stored = h.pipeline.shopping_list(&alice(), block_id).await;
    assert_eq!(stored.data, Some(list));
}

#[tokio::test]
async fn regenerating_replaces_the_stored_list() {
    let h = harness(FakeProvider::new().with_default_response(
        r#"[{"name": "Tomatoes", "amount": "lots"}, {"name": "Onion", "amount": "1"}]"#,
    ));
    let block_id = seeded_block(&h);

    h.pipeline.generate_shopping_list(&alice(), block_id).await;
    h.pipeline.generate_shopping_list(&alice(), block_id).await;

    let stored = h.pipeline.shopping_list(&alice(), block_id).await;
    assert_eq!(
        stored.data.unwrap().list.unwrap(),
        vec![item("Tomatoes", "lots"), item("Onion", "1")]
    );
}

#[tokio::test]
async fn list_missing_an_ingredient_is_not_stored() {
    let h = harness(
        FakeProvider::new()
            .with_default_response(r#"[{"name": "Tomatoes", "amount": "2 + 400g"}]"#),
    );
    let block_id = seeded_block(&h);

    let result = h.pipeline.generate_shopping_list(&alice(), block_id).await;

    assert_eq!(result.error_kind, Some(ErrorKind::MalformedResponse));
    let stored = h.pipeline.shopping_list(&alice(), block_id).await;
    assert!(!stored.data.unwrap().exists);
}

#[tokio::test]
async fn unusable_list_entry_is_a_malformed_reply() {
    let h = harness(FakeProvider::new().with_default_response(
        r#"[{"name": "Tomatoes", "amount": "2 + 400g"}, {"name": "Red Onion", "amount": "1"},
            {"name": "", "amount": "1"}]"#,
    ));
    let block_id = seeded_block(&h);

    let result = h.pipeline.generate_shopping_list(&alice(), block_id).await;

    assert_eq!(result.error_kind, Some(ErrorKind::MalformedResponse));
    assert!(result.errors.is_empty());
    let stored = h.pipeline.shopping_list(&alice(), block_id).await;
    assert!(!stored.data.unwrap().exists);
}

#[tokio::test]
async fn block_without_ingredients_is_a_field_error() {
    let h = harness(FakeProvider::default());
    let block_id = h.gateway.seed_block(&alice(), "Empty", &[]);

    let result = h.pipeline.generate_shopping_list(&alice(), block_id).await;

    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert_eq!(result.errors[0].field_name, "block_id");
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn blocks_of_other_users_are_not_found() {
    let h = harness(FakeProvider::default());
    let block_id = seeded_block(&h);

    let generated = h.pipeline.generate_shopping_list(&bob(), block_id).await;
    let loaded = h.pipeline.shopping_list(&bob(), block_id).await;
    let searched = h.pipeline.find_recipes(&bob(), block_id, "Daal").await;

    assert_eq!(generated.error_kind, Some(ErrorKind::NotFound));
    assert_eq!(loaded.error_kind, Some(ErrorKind::NotFound));
    assert_eq!(searched.error_kind, Some(ErrorKind::NotFound));
    assert_eq!(h.llm.call_count(), 0);
}

// ---------------------------------------------------------------------------
// search-to-add
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingredient_search_skips_linked_ingredients() {
    let h = harness(FakeProvider::default());
    let recipe_id = h.gateway.seed_recipe(
        &alice(),
        "Daal",
        LINK,
        &[("Red Lentils", false, "200g")],
    );
    h.gateway.seed_recipe(
        &alice(),
        "Salad",
        "https://a.example/salad",
        &[("Green Lentils", false, "100g"), ("Lettuce", false, "1")],
    );
    h.gateway
        .seed_recipe(&bob(), "Soup", "https://b.example/", &[("Brown Lentils", false, "1")]);

    let result = h.pipeline.find_ingredients(&alice(), recipe_id, " lentil ").await;

    let names: Vec<String> = result.data.unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["Green Lentils".to_string()]);
}

#[tokio::test]
async fn recipe_search_caps_results() {
    let h = harness(FakeProvider::default());
    let block_id = h.gateway.seed_block(&alice(), "Week 1", &[]);
    for i in 0..15 {
        h.gateway.seed_recipe(
            &alice(),
            &format!("Curry {i:02}"),
            &format!("https://a.example/{i}"),
            &[],
        );
    }

    let result = h.pipeline.find_recipes(&alice(), block_id, "curry").await;

    let found = result.data.unwrap();
    assert_eq!(found.len(), 10);
    assert_eq!(found[0].name, "Curry 00");
}

#[tokio::test]
async fn recipe_search_never_returns_other_users_recipes() {
    let h = harness(FakeProvider::default());
    let block_id = h.gateway.seed_block(&alice(), "Week 1", &[]);
    let korma = h
        .gateway
        .seed_recipe(&alice(), "Korma Curry", "https://a.example/korma", &[]);
    h.gateway
        .seed_recipe(&bob(), "Curry", "https://b.example/curry", &[]);

    let result = h.pipeline.find_recipes(&alice(), block_id, "curry").await;

    let found = result.data.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, korma);
}

#[tokio::test]
async fn blank_query_returns_nothing() {
    let h = harness(FakeProvider::default());

    let result = h.pipeline.find_ingredients(&alice(), 1, "   ").await;

    assert!(result.is_success());
    assert!(result.data.unwrap().is_empty());
}

#[tokio::test]
async fn searching_a_missing_recipe_is_not_found() {
    let h = harness(FakeProvider::default());

    let result = h.pipeline.find_ingredients(&alice(), 42, "salt").await;

    assert_eq!(result.error_kind, Some(ErrorKind::NotFound));
}
