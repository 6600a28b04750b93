//! Sibling ordering
//!
//! Tasks inside a column and columns inside a board carry a zero-based
//! `order`. Moving one entity is expressed as a [`MovePlan`]: a short list of
//! relative shifts over order ranges plus the final placement of the moved
//! entity. The server persists a plan through range-scoped updates, the client
//! mirror reaches the same end state with [`array_move`], and [`apply_plan`]
//! lets tests check that both agree.

use crate::Order;
use serde::{Deserialize, Serialize};

// ============================================================================
// PLACEMENT AND RANGES
// ============================================================================

/// Where an entity sits: its parent (column for tasks, board for columns)
/// and its order among the parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement<P> {
    pub parent: P,
    pub order: Order,
}

impl<P> Placement<P> {
    pub fn new(parent: P, order: Order) -> Self {
        Self { parent, order }
    }
}

/// Order predicate used to select the siblings a shift applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRange {
    /// `order > n`
    Above(Order),
    /// `order >= n`
    AtOrAbove(Order),
    /// `low <= order <= high`
    Between { low: Order, high: Order },
}

impl OrderRange {
    pub fn contains(&self, order: Order) -> bool {
        match *self {
            OrderRange::Above(n) => order > n,
            OrderRange::AtOrAbove(n) => order >= n,
            OrderRange::Between { low, high } => low <= order && order <= high,
        }
    }

    /// Inclusive `(low, high)` bounds, for backends that filter with
    /// `BETWEEN`.
    pub fn bounds(&self) -> (Order, Order) {
        match *self {
            OrderRange::Above(n) => (n.saturating_add(1), Order::MAX),
            OrderRange::AtOrAbove(n) => (n, Order::MAX),
            OrderRange::Between { low, high } => (low, high),
        }
    }
}

/// `order += delta` for every child of `parent` whose order is in `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShift<P> {
    pub parent: P,
    pub range: OrderRange,
    pub delta: i32,
}

/// The set of updates that moves one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePlan<P> {
    /// Source and target placement are identical.
    Noop,
    /// Apply `shifts` in sequence, then write `target` onto the moved entity.
    Move {
        shifts: Vec<OrderShift<P>>,
        target: Placement<P>,
    },
}

impl<P> MovePlan<P> {
    pub fn is_noop(&self) -> bool {
        matches!(self, MovePlan::Noop)
    }

    pub fn target(&self) -> Option<&Placement<P>> {
        match self {
            MovePlan::Noop => None,
            MovePlan::Move { target, .. } => Some(target),
        }
    }
}

// ============================================================================
// PLANNING
// ============================================================================

/// Compute the shifts that move an entity from `from` to `to`.
///
/// Within one parent, moving forward (`o < n`) pulls `(o, n]` down by one and
/// moving backward (`o > n`) pushes `[n, o)` up by one. Across parents, the
/// source closes its gap above `o` and the destination opens a slot at `n`.
pub fn plan_move<P: Copy + PartialEq>(from: Placement<P>, to: Placement<P>) -> MovePlan<P> {
    let shifts = if from.parent == to.parent {
        let (o, n) = (from.order, to.order);
        if o == n {
            return MovePlan::Noop;
        }
        if o < n {
            vec![OrderShift {
                parent: from.parent,
                range: OrderRange::Between { low: o + 1, high: n },
                delta: -1,
            }]
        } else {
            vec![OrderShift {
                parent: from.parent,
                range: OrderRange::Between { low: n, high: o - 1 },
                delta: 1,
            }]
        }
    } else {
        vec![
            OrderShift {
                parent: from.parent,
                range: OrderRange::Above(from.order),
                delta: -1,
            },
            OrderShift {
                parent: to.parent,
                range: OrderRange::AtOrAbove(to.order),
                delta: 1,
            },
        ]
    };

    MovePlan::Move { shifts, target: to }
}

/// Clamp a requested landing index to the destination.
///
/// `siblings` counts the destination's children excluding the moved entity,
/// so the largest valid slot is the append position.
pub fn clamp_index(requested: usize, siblings: usize) -> Order {
    to_order(requested.min(siblings))
}

/// Order for an entity appended after `existing`: `max + 1`, or `0` when
/// there are no siblings.
pub fn next_order<I>(existing: I) -> Order
where
    I: IntoIterator<Item = Order>,
{
    existing.into_iter().max().map_or(0, |max| max.saturating_add(1))
}

/// Whether `orders` is exactly `{0, 1, ..., n-1}`.
pub fn is_contiguous<I>(orders: I) -> bool
where
    I: IntoIterator<Item = Order>,
{
    let mut orders: Vec<Order> = orders.into_iter().collect();
    orders.sort_unstable();
    orders
        .iter()
        .enumerate()
        .all(|(index, order)| to_order(index) == *order)
}

/// Renumber `entries` to `0..n-1`, keeping their sequence.
///
/// `entries` must already be in display order. Only the entries whose order
/// changes are returned.
pub fn compact<I: Copy>(entries: &[(I, Order)]) -> Vec<(I, Order)> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, (id, order))| {
            let wanted = to_order(index);
            (wanted != *order).then_some((*id, wanted))
        })
        .collect()
}

/// Convert a list position into an order value.
pub fn to_order(index: usize) -> Order {
    Order::try_from(index).unwrap_or(Order::MAX)
}

// ============================================================================
// IN-MEMORY APPLICATION
// ============================================================================

/// An entity that has a placement among siblings.
pub trait Sequenced {
    type Id: Copy + PartialEq;
    type Parent: Copy + PartialEq;

    fn sequence_id(&self) -> Self::Id;
    fn placement(&self) -> Placement<Self::Parent>;
    fn set_placement(&mut self, placement: Placement<Self::Parent>);
}

/// Apply `plan` to an in-memory collection the same way storage applies it:
/// every shift in turn, then the target placement on `moved`.
pub fn apply_plan<T: Sequenced>(items: &mut [T], moved: T::Id, plan: &MovePlan<T::Parent>) {
    let MovePlan::Move { shifts, target } = plan else {
        return;
    };

    for shift in shifts {
        for item in items.iter_mut() {
            let placement = item.placement();
            if placement.parent == shift.parent && shift.range.contains(placement.order) {
                item.set_placement(Placement::new(placement.parent, placement.order + shift.delta));
            }
        }
    }

    if let Some(item) = items.iter_mut().find(|item| item.sequence_id() == moved) {
        item.set_placement(*target);
    }
}

/// Move the element at `from` to `to` by removing then inserting.
///
/// `to` is clamped to the list bounds; an out-of-range `from` leaves the
/// list untouched.
pub fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() {
        return;
    }
    let item = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, item);
}

// ============================================================================
// TESTS
// ============================================================================
