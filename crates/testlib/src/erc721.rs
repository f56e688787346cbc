use {
    alloy::primitives::Address,
    model::{NonFungible, TokenId, TransferError},
    std::{collections::HashMap, sync::Mutex},
};

/// Minimal ERC721 collection whose metadata URIs are `base_uri` followed by
/// the token id.
#[derive(Debug)]
pub struct Erc721 {
    address: Address,
    base_uri: String,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    owners: HashMap<TokenId, Address>,
    approvals: HashMap<TokenId, Address>,
}

impl Erc721 {
    pub fn new(address: Address, base_uri: &str) -> Self {
        Self {
            address,
            base_uri: base_uri.to_string(),
            state: Default::default(),
        }
    }

    /// # Panics
    ///
    /// Panics if the token already exists.
    pub fn mint(&self, to: Address, id: u64) {
        let id = TokenId::from(id);
        let previous = self.state.lock().unwrap().owners.insert(id, to);
        assert!(previous.is_none(), "token {id} minted twice");
    }
}

impl NonFungible for Erc721 {
    fn address(&self) -> Address {
        self.address
    }

    fn owner_of(&self, id: TokenId) -> Option<Address> {
        self.state.lock().unwrap().owners.get(&id).copied()
    }

    fn balance_of(&self, account: Address) -> usize {
        self.state
            .lock()
            .unwrap()
            .owners
            .values()
            .filter(|owner| **owner == account)
            .count()
    }

    fn get_approved(&self, id: TokenId) -> Option<Address> {
        self.state.lock().unwrap().approvals.get(&id).copied()
    }

    fn approve(&self, caller: Address, spender: Address, id: TokenId) -> Result<(), TransferError> {
        let mut state = self.state.lock().unwrap();
        match state.owners.get(&id) {
            None => Err(TransferError::UnknownToken(id)),
            Some(owner) if *owner != caller => Err(TransferError::NotApproved(id)),
            Some(_) => {
                state.approvals.insert(id, spender);
                Ok(())
            }
        }
    }

    fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: TokenId,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock().unwrap();
        let owner = *state.owners.get(&id).ok_or(TransferError::UnknownToken(id))?;
        let approved = state.approvals.get(&id) == Some(&caller);
        if owner != from || (caller != owner && !approved) {
            return Err(TransferError::NotApproved(id));
        }
        state.approvals.remove(&id);
        state.owners.insert(id, to);
        Ok(())
    }

    fn token_uri(&self, id: TokenId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .owners
            .contains_key(&id)
            .then(|| format!("{}{}", self.base_uri, id))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::accounts::account};

    #[test]
    fn approved_spender_can_transfer_once() {
        let collection = Erc721::new(Address::with_last_byte(0xc0), "test/");
        collection.mint(account(1), 123);
        let id = TokenId::from(123);

        assert_eq!(
            collection.transfer_from(account(2), account(1), account(2), id),
            Err(TransferError::NotApproved(id))
        );
        collection.approve(account(1), account(2), id).unwrap();
        collection
            .transfer_from(account(2), account(1), account(3), id)
            .unwrap();
        assert_eq!(collection.owner_of(id), Some(account(3)));
        assert_eq!(collection.get_approved(id), None);
        assert_eq!(collection.token_uri(id).as_deref(), Some("test/123"));
        assert_eq!(collection.token_uri(TokenId::from(1)), None);
    }
}
