use crate::{
    PlayerId,
    layout::{
        BoardLayout,
        Tile,
    },
    session::SessionContext,
    snapshot::Snapshot,
};

/// Actions the UI may currently offer to the local player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGate {
    pub can_roll: bool,
    pub can_buy: bool,
    /// The tile a purchase would buy; set only when `can_buy`.
    pub buyable_tile: Option<Tile>,
}

impl Default for ActionGate {
    fn default() -> Self {
        Self {
            can_roll: true,
            can_buy: false,
            buyable_tile: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gatekeeper {
    local_player: PlayerId,
}

impl Gatekeeper {
    pub fn new(session: &SessionContext) -> Self {
        Self {
            local_player: session.player_id.clone(),
        }
    }

    pub fn evaluate(&self, snapshot: Option<&Snapshot>, layout: &BoardLayout) -> ActionGate {
        evaluate(snapshot, layout, &self.local_player)
    }
}

/// Rolling is always offered; the server rejects it when illegal. Buying is
/// offered only for an unowned ordinary property the player can afford.
pub fn evaluate(
    snapshot: Option<&Snapshot>,
    layout: &BoardLayout,
    local_player: &str,
) -> ActionGate {
    let buyable = snapshot.and_then(|snapshot| {
        let player = snapshot.player(local_player)?;
        let tile = layout.tile(player.slot)?;
        let purchasable = tile.kind.is_ordinary_property()
            && !snapshot.is_owned(tile.id)
            && player.money >= i64::from(tile.price);
        purchasable.then(|| tile.clone())
    });
    ActionGate {
        can_roll: true,
        can_buy: buyable.is_some(),
        buyable_tile: buyable,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::{
        layout::{
            TileKind,
            test_helpers::layout_with,
        },
        snapshot::Player,
    };

    const SLOT: u8 = 16;

    fn standing_on(money: i64, owned_by: Option<&str>) -> Snapshot {
        let players = [
            Player::new("me", "Me").at_slot(SLOT).with_money(money),
            Player::new("rival", "Rival").at_slot(3),
        ];
        let ownership = owned_by.map(|owner| (SLOT, owner.to_string()));
        Snapshot::new(players, ownership, None, None).unwrap()
    }

    fn property_priced(price: u32) -> BoardLayout {
        layout_with([Tile::new(SLOT, "Hyderabad Cyber", TileKind::Property, price)])
    }

    #[test]
    fn evaluate__affordable_unowned_property__can_buy() {
        // given
        let snapshot = standing_on(200, None);
        let layout = property_priced(180);

        // when
        let gate = evaluate(Some(&snapshot), &layout, "me");

        // then
        assert!(gate.can_buy);
        assert_eq!(gate.buyable_tile.map(|t| t.id), Some(SLOT));
    }

    #[test]
    fn evaluate__price_above_money__cannot_buy() {
        // given
        let snapshot = standing_on(200, None);
        let layout = property_priced(220);

        // when
        let gate = evaluate(Some(&snapshot), &layout, "me");

        // then
        assert!(!gate.can_buy);
        assert_eq!(gate.buyable_tile, None);
    }

    #[test]
    fn evaluate__exact_money__can_buy() {
        let gate = evaluate(Some(&standing_on(180, None)), &property_priced(180), "me");
        assert!(gate.can_buy);
    }

    #[test]
    fn evaluate__owned_tile__cannot_buy_regardless_of_money() {
        for owner in ["me", "rival"] {
            // given
            let snapshot = standing_on(10_000, Some(owner));

            // when
            let gate = evaluate(Some(&snapshot), &property_priced(180), "me");

            // then
            assert!(!gate.can_buy, "owned by {owner}");
        }
    }

    #[test]
    fn evaluate__non_property_tiles__cannot_buy() {
        for kind in [
            TileKind::Station,
            TileKind::Utility,
            TileKind::Corner,
            TileKind::Chance,
            TileKind::Tax,
        ] {
            // given
            let layout = layout_with([Tile::new(SLOT, "Somewhere", kind, 100)]);

            // when
            let gate = evaluate(Some(&standing_on(200, None)), &layout, "me");

            // then
            assert!(!gate.can_buy, "{kind:?} offered for purchase");
        }
    }

    #[test]
    fn evaluate__nothing_known_yet__roll_only() {
        // when
        let gate = evaluate(None, &BoardLayout::empty(), "me");

        // then
        assert_eq!(gate, ActionGate::default());
        assert!(gate.can_roll);
    }

    #[test]
    fn evaluate__layout_not_fetched__cannot_buy() {
        let gate = evaluate(Some(&standing_on(200, None)), &BoardLayout::empty(), "me");
        assert!(!gate.can_buy);
    }

    #[test]
    fn gatekeeper__local_player_from_session__evaluates_for_that_player() {
        // given
        let session = SessionContext::new("room-1", "rival", "Rival");
        let gatekeeper = Gatekeeper::new(&session);

        // when
        let gate = gatekeeper.evaluate(Some(&standing_on(200, None)), &property_priced(180));

        // then
        assert!(!gate.can_buy);
    }
}
