use sqlx::PgConnection;

use crate::models::couponmodel::Coupon;

pub const COUPON_COLUMNS: &str =
    "id, code, plan_id, common_ad, highlight_ad, is_active, created_at";

/// Consumes a coupon by flipping `is_active` inside the caller's
/// transaction. Returns None when the code is unknown or already spent; the
/// guard makes a second redemption lose the race even under concurrency.
pub async fn redeem_coupon(
    conn: &mut PgConnection,
    code: &str,
) -> Result<Option<Coupon>, sqlx::Error> {
    sqlx::query_as::<_, Coupon>(&format!(
        "UPDATE coupons SET is_active = FALSE \
         WHERE code = $1 AND is_active = TRUE \
         RETURNING {}",
        COUPON_COLUMNS
    ))
    .bind(code)
    .fetch_optional(&mut *conn)
    .await
}
