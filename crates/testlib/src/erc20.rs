use {
    alloy::primitives::{Address, U256},
    model::{Fungible, TransferError},
    std::{collections::HashMap, sync::Mutex},
};

/// Minimal ERC20 ledger with an unrestricted `mint`.
#[derive(Debug)]
pub struct Erc20 {
    address: Address,
    decimals: u8,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
    frozen: bool,
    /// Transfers still let through before the ledger starts rejecting them.
    budget: Option<usize>,
}

impl Erc20 {
    pub fn new(address: Address) -> Self {
        Self::with_decimals(address, 18)
    }

    pub fn with_decimals(address: Address, decimals: u8) -> Self {
        Self {
            address,
            decimals,
            state: Default::default(),
        }
    }

    pub fn mint(&self, to: Address, amount: u64) {
        let amount = U256::from(amount);
        let mut state = self.state.lock().unwrap();
        *state.balances.entry(to).or_default() += amount;
        state.total_supply += amount;
    }

    pub fn total_supply(&self) -> U256 {
        self.state.lock().unwrap().total_supply
    }

    /// While frozen every transfer is rejected. Used to exercise the error
    /// paths of components built on top of the ledger. Unfreezing also lifts
    /// any [`Erc20::fail_after`] budget.
    pub fn set_frozen(&self, frozen: bool) {
        let mut state = self.state.lock().unwrap();
        state.frozen = frozen;
        state.budget = None;
    }

    /// Lets the next `transfers` transfers (plain or delegated) succeed and
    /// rejects every one after them.
    pub fn fail_after(&self, transfers: usize) {
        self.state.lock().unwrap().budget = Some(transfers);
    }
}

impl State {
    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), TransferError> {
        if self.frozen || self.budget == Some(0) {
            return Err(TransferError::Rejected("ledger is frozen".into()));
        }
        let available = self.balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        if let Some(budget) = &mut self.budget {
            *budget -= 1;
        }
        self.balances.insert(from, available - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }
}

impl Fungible for Erc20 {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(&self, caller: Address, to: Address, amount: U256) -> Result<(), TransferError> {
        self.state.lock().unwrap().move_balance(caller, to, amount)
    }

    fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((caller, spender), amount);
        Ok(())
    }

    fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock().unwrap();
        let available = state
            .allowances
            .get(&(from, caller))
            .copied()
            .unwrap_or_default();
        if available < amount {
            return Err(TransferError::InsufficientAllowance {
                available,
                required: amount,
            });
        }
        state.move_balance(from, to, amount)?;
        state.allowances.insert((from, caller), available - amount);
        Ok(())
    }
}
