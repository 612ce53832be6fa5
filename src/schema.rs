table! {
    articles (id) {
        id -> Int4,
        title -> Varchar,
        content -> Text,
        category -> Varchar,
        status -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
