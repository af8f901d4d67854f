//! Loyalty Points Module
//!
//! 积分余额只通过这里的原子 UPDATE 变化，读取-修改-写回会在并发
//! 下丢更新。结算发生在下单成功后，冲正发生在取消时。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::models::User;
use crate::db::repository::{RepoError, RepoResult};

#[derive(Clone)]
pub struct LoyaltyLedger {
    db: Surreal<Db>,
}

impl LoyaltyLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Settle an order: deduct the points spent, credit the points earned
    pub async fn settle(
        &self,
        user: &RecordId,
        points_used: i64,
        points_earned: i64,
    ) -> RepoResult<User> {
        let updated: Option<User> = self
            .db
            .query("UPDATE $thing SET reward_points = reward_points - $used + $earned RETURN AFTER")
            .bind(("thing", user.clone()))
            .bind(("used", points_used))
            .bind(("earned", points_earned))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User not found: {user}")))
    }

    /// Reverse a settlement on cancellation: refund spent points, claw back
    /// earned points. Clamped at zero so a drained balance cannot go negative.
    pub async fn reverse(
        &self,
        user: &RecordId,
        points_used: i64,
        points_earned: i64,
    ) -> RepoResult<User> {
        let updated: Option<User> = self
            .db
            .query("UPDATE $thing SET reward_points = math::max([reward_points + $used - $earned, 0]) RETURN AFTER")
            .bind(("thing", user.clone()))
            .bind(("used", points_used))
            .bind(("earned", points_earned))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User not found: {user}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::UserRepository;

    async fn seeded_user(points: i64) -> (DbService, RecordId) {
        let db = DbService::memory().await.unwrap();
        let repo = UserRepository::new(db.db.clone());
        let mut user = User::new("ayesha", "ayesha@example.com");
        user.reward_points = points;
        let created = repo.create(user).await.unwrap();
        (db, created.id.unwrap())
    }

    #[tokio::test]
    async fn test_settle_moves_balance_both_ways() {
        let (db, id) = seeded_user(100).await;
        let ledger = LoyaltyLedger::new(db.db.clone());

        let user = ledger.settle(&id, 30, 7).await.unwrap();
        assert_eq!(user.reward_points, 77);
    }

    #[tokio::test]
    async fn test_reverse_restores_balance() {
        let (db, id) = seeded_user(100).await;
        let ledger = LoyaltyLedger::new(db.db.clone());

        ledger.settle(&id, 30, 7).await.unwrap();
        let user = ledger.reverse(&id, 30, 7).await.unwrap();
        assert_eq!(user.reward_points, 100);
    }

    #[tokio::test]
    async fn test_reverse_clamps_at_zero() {
        let (db, id) = seeded_user(2).await;
        let ledger = LoyaltyLedger::new(db.db.clone());

        // Earned more than the current balance holds (points already spent
        // elsewhere); the claw-back must not drive the balance negative.
        let user = ledger.reverse(&id, 0, 10).await.unwrap();
        assert_eq!(user.reward_points, 0);
    }
}
