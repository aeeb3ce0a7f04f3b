use bookshelf::app::Book;
use serde_json::{json, Value};

use crate::helper::spawn_app;

#[tokio::test]
async fn add_book_without_a_token_returns_a_401() {
    let app = spawn_app().await;

    let response = app
        .post_book(None, &json!({"title": "T", "author": "X"}))
        .await;

    assert_eq!(401, response.status().as_u16());
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM books")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn add_book_with_a_non_bearer_header_returns_a_401() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let test_cases = [
        ("authorization", format!("Basic {}", token)),
        ("authorization", token.clone()),
        ("token", token.clone()),
    ];

    for (header, value) in test_cases {
        let response = app
            .api_client
            .post(format!("{}/books/add", app.addr))
            .header(header, value.as_str())
            .json(&json!({"title": "T", "author": "X"}))
            .send()
            .await
            .unwrap();

        assert_eq!(
            401,
            response.status().as_u16(),
            "`{}: {}` was accepted",
            header,
            value
        );
    }
}

#[tokio::test]
async fn tampered_token_returns_a_401_with_the_reason() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let mut segments: Vec<String> = token.split('.').map(str::to_owned).collect();
    let forged = app.tokens.encode(
        json!({"username": "admin", "iat": 0, "exp": i64::MAX})
            .as_object()
            .unwrap(),
    );
    segments[1] = forged.split('.').nth(1).unwrap().to_owned();
    let tampered = segments.join(".");

    let response = app
        .post_book(Some(&tampered), &json!({"title": "T", "author": "X"}))
        .await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("signature"));
}

#[tokio::test]
async fn expired_token_returns_a_401() {
    let app = spawn_app().await;
    let token = app.tokens.encode(
        json!({"username": "a", "iat": 1_000, "exp": 2_000})
            .as_object()
            .unwrap(),
    );

    let response = app
        .post_book(Some(&token), &json!({"title": "T", "author": "X"}))
        .await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn token_signed_with_another_key_returns_a_401() {
    let app = spawn_app().await;
    let other = bookshelf::token::TokenCodec::new(
        &secrecy::Secret::new("not-the-server-key".to_owned()),
        time::Duration::minutes(5),
    );

    let response = app
        .post_book(Some(&other.issue("a")), &json!({"title": "T", "author": "X"}))
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn added_book_can_be_fetched_by_id() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let response = app
        .post_book(Some(&token), &json!({"title": "T", "author": "X"}))
        .await;
    assert_eq!(200, response.status().as_u16());
    let added: Book = response.json().await.unwrap();
    assert_eq!(added.title, "T");
    assert_eq!(added.author, "X");
    assert_eq!(added.description, None);

    let response = app.get_book(&token, added.id).await;
    assert_eq!(200, response.status().as_u16());
    let fetched: Book = response.json().await.unwrap();
    assert_eq!(fetched, added);

    let response = app.get_book(&token, added.id + 1).await;
    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn get_book_without_a_token_returns_a_401() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/books/1", app.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn add_book_returns_a_400_when_fields_are_present_but_invalid() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let test_cases = [
        (json!({"title": "", "author": "X"}), "empty title"),
        (json!({"title": "T", "author": "   "}), "blank author"),
        (json!({"title": "a".repeat(257), "author": "X"}), "overlong title"),
    ];

    for (body, description) in test_cases {
        let response = app.post_book(Some(&token), &body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn add_book_returns_a_422_when_data_is_missing() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let response = app.post_book(Some(&token), &json!({"title": "T"})).await;

    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn update_overwrites_every_field() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let added: Book = app
        .post_book(
            Some(&token),
            &json!({"title": "T", "author": "X", "description": "first edition"}),
        )
        .await
        .json()
        .await
        .unwrap();

    let response = app
        .put_book(&token, added.id, &json!({"title": "T2", "author": "Y"}))
        .await;

    assert_eq!(200, response.status().as_u16());
    let updated: Book = response.json().await.unwrap();
    assert_eq!(
        updated,
        Book {
            id: added.id,
            title: "T2".into(),
            author: "Y".into(),
            description: None,
        }
    );
    let fetched: Book = app.get_book(&token, added.id).await.json().await.unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_of_a_nonexistent_book_returns_a_404() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let response = app
        .put_book(&token, 42, &json!({"title": "T", "author": "X"}))
        .await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_returns_the_removed_book() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let added: Book = app
        .post_book(Some(&token), &json!({"title": "T", "author": "X"}))
        .await
        .json()
        .await
        .unwrap();

    let response = app.delete_book(&token, added.id).await;
    assert_eq!(200, response.status().as_u16());
    let deleted: Book = response.json().await.unwrap();
    assert_eq!(deleted, added);

    assert_eq!(404, app.get_book(&token, added.id).await.status().as_u16());
    assert_eq!(404, app.delete_book(&token, added.id).await.status().as_u16());
}

#[tokio::test]
async fn delete_of_a_nonexistent_book_returns_a_404() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let response = app.delete_book(&token, 42).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn list_applies_skip_and_limit_in_storage_order() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    for i in 0..15 {
        let response = app
            .post_book(
                Some(&token),
                &json!({"title": format!("Book {}", i), "author": "X"}),
            )
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    let first_page: Vec<Book> = app.list_books(&token, &[]).await.json().await.unwrap();
    assert_eq!(first_page.len(), 10);
    assert_eq!(first_page[0].title, "Book 0");

    let page: Vec<Book> = app
        .list_books(&token, &[("skip", "12"), ("limit", "5")])
        .await
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = page.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Book 12", "Book 13", "Book 14"]);
}

#[tokio::test]
async fn list_rejects_a_negative_skip() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;

    let response = app.list_books(&token, &[("skip", "-1")]).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn search_matches_case_insensitive_substrings() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    for (title, author) in [
        ("The Hobbit", "J. R. R. Tolkien"),
        ("The Silmarillion", "J. R. R. Tolkien"),
        ("Hobbit Cookbook", "Anonymous"),
    ] {
        app.post_book(Some(&token), &json!({"title": title, "author": author}))
            .await;
    }

    let titles = |books: Vec<Book>| -> Vec<String> { books.into_iter().map(|b| b.title).collect() };

    let found: Vec<Book> = app
        .search_books(&token, &[("title", "HOBBIT")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(titles(found), ["The Hobbit", "Hobbit Cookbook"]);

    let found: Vec<Book> = app
        .search_books(&token, &[("title", "hobbit"), ("author", "tolkien")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(titles(found), ["The Hobbit"]);

    let found: Vec<Book> = app.search_books(&token, &[]).await.json().await.unwrap();
    assert_eq!(found.len(), 3);

    let found: Vec<Book> = app
        .search_books(&token, &[("title", "")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 3);

    let found: Vec<Book> = app
        .search_books(&token, &[("author", "%")])
        .await
        .json()
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn search_without_a_token_returns_a_401() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/books/?title=x", app.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn list_update_and_delete_without_a_token_return_a_401() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let added: Book = app
        .post_book(Some(&token), &json!({"title": "T", "author": "X"}))
        .await
        .json()
        .await
        .unwrap();
    let url = format!("{}/books/{}", app.addr, added.id);

    let test_cases = [
        (
            app.api_client.get(format!("{}/books/get", app.addr)),
            "list",
        ),
        (
            app.api_client
                .put(&url)
                .json(&json!({"title": "T2", "author": "Y"})),
            "update",
        ),
        (app.api_client.delete(&url), "delete"),
    ];

    for (request, operation) in test_cases {
        let response = request.send().await.unwrap();
        assert_eq!(
            401,
            response.status().as_u16(),
            "{} succeeded without a token",
            operation
        );
    }

    let fetched: Book = app.get_book(&token, added.id).await.json().await.unwrap();
    assert_eq!(fetched, added);
}

#[tokio::test]
async fn writes_are_committed_before_the_response() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let pool = app.independent_pool().await;
    let reader = &pool;
    let stored = move |id: i64| {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_all(reader)
    };

    let added: Book = app
        .post_book(Some(&token), &json!({"title": "T", "author": "X"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stored(added.id).await.unwrap(), [added.clone()]);

    let updated: Book = app
        .put_book(
            &token,
            added.id,
            &json!({"title": "T2", "author": "Y", "description": "revised"}),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stored(added.id).await.unwrap(), [updated]);

    let response = app.delete_book(&token, added.id).await;
    assert_eq!(200, response.status().as_u16());
    assert!(stored(added.id).await.unwrap().is_empty());
}
