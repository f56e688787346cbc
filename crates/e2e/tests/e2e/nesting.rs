use {
    arbitration::{Authority, Error, Metadata, WrappedCollection, WrappedToken},
    e2e::setup::*,
    model::EventLog,
    std::sync::Arc,
    testlib::{Erc20, Erc721, accounts::contract},
};

#[test]
fn cant_nest_arbitrables() {
    run_test(|| {
        let events = EventLog::new();
        let authority = Arc::new(Authority::new(contract(0), DEPLOYER, events.clone()));

        let token = Arc::new(
            WrappedToken::new(
                contract(1),
                Arc::new(Erc20::new(contract(2))),
                authority.clone(),
                Metadata::new("foo", "BAR"),
                events.clone(),
            )
            .unwrap(),
        );
        assert!(matches!(
            WrappedToken::new(
                contract(3),
                token,
                authority.clone(),
                Metadata::new("foo", "BAR"),
                events.clone(),
            ),
            Err(Error::CannotNestArbitrable)
        ));

        let collection = Arc::new(
            WrappedCollection::new(
                contract(4),
                Arc::new(Erc721::new(contract(5), "test/")),
                authority.clone(),
                Metadata::new("foo", "BAR"),
                events.clone(),
            )
            .unwrap(),
        );
        assert!(matches!(
            WrappedCollection::new(
                contract(6),
                collection,
                authority,
                Metadata::new("foo", "BAR"),
                events.clone(),
            ),
            Err(Error::CannotNestArbitrable)
        ));

        // Refused before anything happened.
        assert!(events.is_empty());
    });
}
