use crate::domain::entities::plans::AbbrevPlan;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionCodeEntity {
    pub id: String,
    pub code: String,
    pub active: bool,
    pub coupon_valid: bool,
    /// Unix seconds.
    pub expires_at: Option<i64>,
    /// Empty means the coupon applies to every product.
    pub applies_to_products: Vec<String>,
}

impl PromotionCodeEntity {
    pub fn is_valid_for(&self, plan: &AbbrevPlan, now_secs: i64) -> bool {
        if !self.active || !self.coupon_valid {
            return false;
        }

        if self.expires_at.is_some_and(|expires_at| expires_at <= now_secs) {
            return false;
        }

        self.applies_to_products.is_empty()
            || self
                .applies_to_products
                .iter()
                .any(|product| product == &plan.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> AbbrevPlan {
        AbbrevPlan {
            plan_id: "price_1".to_string(),
            product_id: "prod_vpn".to_string(),
            currency: "usd".to_string(),
            ..Default::default()
        }
    }

    fn code() -> PromotionCodeEntity {
        PromotionCodeEntity {
            id: "promo_1".to_string(),
            code: "SAVE10".to_string(),
            active: true,
            coupon_valid: true,
            expires_at: Some(2_000),
            applies_to_products: vec!["prod_vpn".to_string()],
        }
    }

    #[test]
    fn valid_code_applies_to_plan_product() {
        assert!(code().is_valid_for(&plan(), 1_000));
    }

    #[test]
    fn expired_or_inactive_code_is_rejected() {
        assert!(!code().is_valid_for(&plan(), 2_000));

        let inactive = PromotionCodeEntity {
            active: false,
            ..code()
        };
        assert!(!inactive.is_valid_for(&plan(), 1_000));
    }

    #[test]
    fn code_for_another_product_is_rejected() {
        let other = PromotionCodeEntity {
            applies_to_products: vec!["prod_relay".to_string()],
            ..code()
        };
        assert!(!other.is_valid_for(&plan(), 1_000));

        let unrestricted = PromotionCodeEntity {
            applies_to_products: Vec::new(),
            ..code()
        };
        assert!(unrestricted.is_valid_for(&plan(), 1_000));
    }
}
