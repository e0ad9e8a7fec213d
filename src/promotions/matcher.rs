//! # Promotion Matching
//!
//! Pure rule evaluation over priced cart lines. Line discounts resolve
//! first-match-wins over promotions ordered newest first; bundle
//! specials are matched cart-wide against the lines that kept their
//! base price.

use std::collections::HashMap;

use crate::catalog::VariantRef;
use crate::types::Money;

use super::model::{AppliedPromotion, Promotion, PromotionKind};

/// One priced cart line as the matcher sees it.
#[derive(Debug, Clone)]
pub struct LineContext {
    pub line_id: i64,
    pub variant: VariantRef,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_subtotal: Money,
    /// Daily-special lines are excluded from every discount mechanism.
    pub daily_special: bool,
}

/// First matching line promotion, or `None`.
///
/// `eligible` must already be filtered by schedule and zone/service
/// context and ordered newest first; discounts do not stack, the first
/// match wins.
pub fn best_line_discount(
    eligible: &[Promotion],
    line: &LineContext,
) -> Option<AppliedPromotion> {
    if line.daily_special {
        return None;
    }

    for promotion in eligible {
        if promotion.is_bundle() {
            continue;
        }
        if !promotion.scope.covers(&line.variant) {
            continue;
        }
        if let Some(amount) = promotion.line_discount(line.line_subtotal) {
            if amount > 0 {
                return Some(AppliedPromotion {
                    promotion_id: promotion.id,
                    name: promotion.name.clone(),
                    amount,
                });
            }
        }
    }

    None
}

/// A bundle special that matched the cart.
#[derive(Debug, Clone, serde::Serialize, PartialEq)]
pub struct AppliedBundle {
    pub promotion_id: i64,
    pub name: String,
    pub saving: Money,
}

/// Match bundle specials against `lines` (pass only lines that kept
/// their base price: no daily special, no line discount).
///
/// Each bundle applies at most once. When bundles compete for the same
/// items, the greatest saving is taken first; item quantities consumed
/// by one application are unavailable to the next.
pub fn apply_bundles(eligible: &[Promotion], lines: &[LineContext]) -> Vec<AppliedBundle> {
    let mut pool: HashMap<i64, i64> = HashMap::new();
    let mut unit_prices: HashMap<i64, Money> = HashMap::new();
    for line in lines {
        *pool.entry(line.variant.variant_id).or_insert(0) += line.quantity;
        unit_prices.insert(line.variant.variant_id, line.unit_price);
    }

    struct Candidate<'a> {
        promotion: &'a Promotion,
        items: &'a [super::model::BundleItem],
        saving: Money,
    }

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for promotion in eligible {
        let PromotionKind::BundleSpecial {
            items,
            bundle_price,
        } = &promotion.kind
        else {
            continue;
        };

        let Some(regular) = bundle_regular_price(items, &pool, &unit_prices) else {
            continue;
        };

        let saving = regular - bundle_price;
        if saving > 0 {
            candidates.push(Candidate {
                promotion,
                items,
                saving,
            });
        }
    }

    // Greatest saving first; newest rule breaks ties.
    candidates.sort_by(|a, b| {
        b.saving
            .cmp(&a.saving)
            .then(b.promotion.id.cmp(&a.promotion.id))
    });

    let mut applied = Vec::new();
    for candidate in candidates {
        if !consume(&mut pool, candidate.items) {
            continue;
        }
        applied.push(AppliedBundle {
            promotion_id: candidate.promotion.id,
            name: candidate.promotion.name.clone(),
            saving: candidate.saving,
        });
    }

    applied
}

/// Regular (undiscounted) price of the bundle's items, or `None` when
/// the pool cannot cover the bundle.
fn bundle_regular_price(
    items: &[super::model::BundleItem],
    pool: &HashMap<i64, i64>,
    unit_prices: &HashMap<i64, Money>,
) -> Option<Money> {
    let mut total = 0;
    for item in items {
        let available = pool.get(&item.variant_id).copied().unwrap_or(0);
        if available < item.quantity {
            return None;
        }
        total += unit_prices.get(&item.variant_id)? * item.quantity;
    }
    Some(total)
}

/// Subtract the bundle's items from the pool; false (and no change) when
/// quantities are no longer available.
fn consume(pool: &mut HashMap<i64, i64>, items: &[super::model::BundleItem]) -> bool {
    for item in items {
        if pool.get(&item.variant_id).copied().unwrap_or(0) < item.quantity {
            return false;
        }
    }
    for item in items {
        *pool.entry(item.variant_id).or_insert(0) -= item.quantity;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductKind;
    use crate::promotions::model::{BundleItem, PromotionScope};
    use crate::types::WeekdaySet;

    fn variant(variant_id: i64, product_id: i64, category_id: i64) -> VariantRef {
        VariantRef {
            variant_id,
            product_id,
            category_id,
            display_name: format!("variant {variant_id}"),
            kind: ProductKind::Simple,
            active: true,
        }
    }

    fn line(line_id: i64, variant_id: i64, quantity: i64, unit_price: Money) -> LineContext {
        LineContext {
            line_id,
            variant: variant(variant_id, variant_id * 10, 1),
            quantity,
            unit_price,
            line_subtotal: unit_price * quantity,
            daily_special: false,
        }
    }

    fn promotion(id: i64, kind: PromotionKind, scope: PromotionScope) -> Promotion {
        Promotion {
            id,
            name: format!("promo {id}"),
            kind,
            scope,
            zone: None,
            service_type: None,
            weekdays: WeekdaySet::all(),
            starts_at: None,
            ends_at: None,
            valid_from: None,
            valid_until: None,
            active: true,
        }
    }

    #[test]
    fn test_first_match_wins_newest_first() {
        // Eligible list arrives newest first; both match.
        let newer = promotion(9, PromotionKind::PercentOff { percent: 5 }, PromotionScope::All);
        let older = promotion(
            3,
            PromotionKind::PercentOff { percent: 50 },
            PromotionScope::All,
        );
        let eligible = vec![newer, older];

        let applied = best_line_discount(&eligible, &line(1, 7, 1, 10_000)).unwrap();
        // The newer rule shadows the older, bigger one.
        assert_eq!(applied.promotion_id, 9);
        assert_eq!(applied.amount, 500);
    }

    #[test]
    fn test_scope_must_cover_line() {
        let scoped = promotion(
            1,
            PromotionKind::PercentOff { percent: 10 },
            PromotionScope::Variants(vec![42]),
        );
        assert!(best_line_discount(&[scoped.clone()], &line(1, 7, 1, 10_000)).is_none());
        assert!(best_line_discount(&[scoped], &line(1, 42, 1, 10_000)).is_some());
    }

    #[test]
    fn test_daily_special_line_gets_nothing() {
        let eligible = vec![promotion(
            1,
            PromotionKind::PercentOff { percent: 10 },
            PromotionScope::All,
        )];
        let mut l = line(1, 7, 1, 10_000);
        l.daily_special = true;
        assert!(best_line_discount(&eligible, &l).is_none());
    }

    #[test]
    fn test_bundle_applies_when_cheaper() {
        let bundle = promotion(
            1,
            PromotionKind::BundleSpecial {
                items: vec![
                    BundleItem {
                        variant_id: 1,
                        quantity: 1,
                    },
                    BundleItem {
                        variant_id: 2,
                        quantity: 1,
                    },
                ],
                bundle_price: 35_000,
            },
            PromotionScope::All,
        );

        let lines = vec![line(1, 1, 1, 30_000), line(2, 2, 1, 10_000)];
        let applied = apply_bundles(&[bundle], &lines);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].saving, 5_000);
    }

    #[test]
    fn test_bundle_skipped_when_not_cheaper() {
        let bundle = promotion(
            1,
            PromotionKind::BundleSpecial {
                items: vec![BundleItem {
                    variant_id: 1,
                    quantity: 1,
                }],
                bundle_price: 50_000,
            },
            PromotionScope::All,
        );

        assert!(apply_bundles(&[bundle], &[line(1, 1, 1, 30_000)]).is_empty());
    }

    #[test]
    fn test_bundle_requires_full_quantities() {
        let bundle = promotion(
            1,
            PromotionKind::BundleSpecial {
                items: vec![BundleItem {
                    variant_id: 1,
                    quantity: 3,
                }],
                bundle_price: 70_000,
            },
            PromotionScope::All,
        );

        assert!(apply_bundles(&[bundle.clone()], &[line(1, 1, 2, 30_000)]).is_empty());
        assert_eq!(apply_bundles(&[bundle], &[line(1, 1, 3, 30_000)]).len(), 1);
    }

    #[test]
    fn test_competing_bundles_take_greatest_saving() {
        // Both bundles want variant 1; only one can have it.
        let small = promotion(
            1,
            PromotionKind::BundleSpecial {
                items: vec![BundleItem {
                    variant_id: 1,
                    quantity: 1,
                }],
                bundle_price: 28_000,
            },
            PromotionScope::All,
        );
        let big = promotion(
            2,
            PromotionKind::BundleSpecial {
                items: vec![
                    BundleItem {
                        variant_id: 1,
                        quantity: 1,
                    },
                    BundleItem {
                        variant_id: 2,
                        quantity: 1,
                    },
                ],
                bundle_price: 30_000,
            },
            PromotionScope::All,
        );

        let lines = vec![line(1, 1, 1, 30_000), line(2, 2, 1, 10_000)];
        let applied = apply_bundles(&[small, big], &lines);

        // big saves 10_000, small saves 2_000; big wins and exhausts variant 1.
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].promotion_id, 2);
        assert_eq!(applied[0].saving, 10_000);
    }

    #[test]
    fn test_bundle_applies_at_most_once() {
        let bundle = promotion(
            1,
            PromotionKind::BundleSpecial {
                items: vec![BundleItem {
                    variant_id: 1,
                    quantity: 1,
                }],
                bundle_price: 25_000,
            },
            PromotionScope::All,
        );

        // Enough items for two applications, but each bundle runs once.
        let applied = apply_bundles(&[bundle], &[line(1, 1, 2, 30_000)]);
        assert_eq!(applied.len(), 1);
    }
}
