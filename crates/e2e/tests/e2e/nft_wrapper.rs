use {
    alloy::primitives::{Address, Bytes},
    arbitration::{Authority, Error, Metadata, WrappedCollection},
    e2e::setup::*,
    model::{Event, EventLog, NonFungible, TokenId},
    std::sync::Arc,
    testlib::{Erc721, accounts::contract},
};

const TOKEN_ID: u64 = 123;

#[test]
fn can_wrap_nft() {
    run_test(wrap_nft);
}

fn wrap_nft() {
    let events = EventLog::new();
    let collection = Arc::new(Erc721::new(contract(0), "test/"));
    let authority = Arc::new(Authority::new(contract(1), DEPLOYER, events.clone()));
    let wrapped = WrappedCollection::new(
        contract(2),
        collection.clone(),
        authority.clone(),
        Metadata::new("foo", "BAR"),
        events.clone(),
    )
    .unwrap();
    let id = TokenId::from(TOKEN_ID);
    let (holder, recipient, receiver) = (account(1), account(2), account(3));

    collection.mint(holder, TOKEN_ID);
    collection.approve(holder, contract(2), id).unwrap();
    wrapped.wrap_nft(holder, id, holder).unwrap();
    assert_eq!(wrapped.owner_of(id), Some(holder));
    assert_eq!(wrapped.token_uri(id).as_deref(), Some("test/123"));

    // Moves without any approval from the holder.
    wrapped
        .arbitrator_transfer(DEPLOYER, id, recipient, Bytes::from_static(b"ruling"))
        .unwrap();
    assert_eq!(wrapped.owner_of(id), Some(recipient));
    assert_eq!(wrapped.balance_of(holder), 0);

    assert_eq!(
        wrapped.unwrap_nft(recipient, id, recipient),
        Err(Error::NotAuthorized)
    );

    authority.change_controller(DEPLOYER, Address::ZERO).unwrap();
    assert_eq!(
        wrapped.arbitrator_transfer(DEPLOYER, id, holder, Bytes::new()),
        Err(Error::NotAuthorized)
    );
    assert_eq!(
        wrapped.unwrap_nft(holder, id, holder),
        Err(Error::NotAuthorized)
    );
    wrapped.unwrap_nft(recipient, id, receiver).unwrap();

    assert_eq!(collection.owner_of(id), Some(receiver));
    assert_eq!(wrapped.owner_of(id), None);

    let kinds: Vec<_> = events
        .drain()
        .into_iter()
        .map(|event| serde_json::to_value(&event).unwrap()["kind"].clone())
        .collect();
    assert_eq!(
        kinds,
        ["wrap", "arbitrator-transfer", "controller-changed", "unwrap"]
    );
}
