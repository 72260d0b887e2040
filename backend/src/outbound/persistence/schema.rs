//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When the
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Accounts that have logged in at least once.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        roles -> Array<Text>,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        password_hash -> Nullable<Text>,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    authors (id) {
        id -> Uuid,
        name -> Varchar,
        surname -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    /// Borrowable items. `stock` carries a `CHECK (stock >= 0)` constraint.
    elements (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Varchar,
        stock -> Int4,
        category_id -> Uuid,
        slug -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    element_tags (element_id, tag_id) {
        element_id -> Uuid,
        tag_id -> Uuid,
    }
}

diesel::table! {
    element_authors (element_id, author_id) {
        element_id -> Uuid,
        author_id -> Uuid,
    }
}

diesel::table! {
    /// Reservation records; `status` holds the snake_case status name.
    reservations (id) {
        id -> Uuid,
        element_id -> Uuid,
        status -> Varchar,
        email -> Varchar,
        nickname -> Varchar,
        user_id -> Nullable<Uuid>,
        comment -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(elements -> categories (category_id));
diesel::joinable!(element_tags -> elements (element_id));
diesel::joinable!(element_tags -> tags (tag_id));
diesel::joinable!(element_authors -> elements (element_id));
diesel::joinable!(element_authors -> authors (author_id));
diesel::joinable!(reservations -> elements (element_id));
diesel::joinable!(reservations -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    tags,
    authors,
    elements,
    element_tags,
    element_authors,
    reservations,
);
