use {
    alloy::primitives::I256,
    anyhow::Result,
    model::PriceFeed,
    std::sync::Mutex,
};

/// Price feed returning whatever answer was last configured.
#[derive(Debug)]
pub struct FixedFeed {
    decimals: u8,
    answer: Mutex<I256>,
}

impl FixedFeed {
    pub fn new(answer: i64, decimals: u8) -> Self {
        Self {
            decimals,
            answer: Mutex::new(I256::try_from(answer).unwrap()),
        }
    }

    pub fn set_answer(&self, answer: i64) {
        *self.answer.lock().unwrap() = I256::try_from(answer).unwrap();
    }
}

impl PriceFeed for FixedFeed {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn latest_answer(&self) -> Result<I256> {
        Ok(*self.answer.lock().unwrap())
    }
}
