//! Diesel table definitions for the ledger schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique login.
        login -> Varchar,
        /// PHC-encoded password hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded orders. `number` is unique across every account.
    orders (number) {
        number -> Varchar,
        user_id -> Uuid,
        /// One of `NEW`, `PROCESSING`, `INVALID`, `PROCESSED`.
        status -> Varchar,
        /// Accrued points in hundredths; zero until `PROCESSED`.
        accrual -> Int8,
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Committed withdrawals, keyed by account and order reference.
    withdrawals (user_id, order_number) {
        user_id -> Uuid,
        order_number -> Varchar,
        /// Withdrawn points in hundredths; always positive.
        amount -> Int8,
        processed_at -> Timestamptz,
    }
}

diesel::joinable!(orders -> users (user_id));
diesel::joinable!(withdrawals -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, orders, withdrawals);
