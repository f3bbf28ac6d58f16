//! Bank session - one account's credentials plus the state of its exchanges
//!
//! The session is the only stateful piece of the SDK. It remembers the stack
//! waiting to be deposited, the last withdrawn stack, the last deposit's
//! receipt number and the last balance snapshot. All mutation goes through
//! `&mut self`, so a session is used by one caller at a time.
//!
//! The two chained operations, [`BankSession::reconcile_and_withdraw`] and
//! [`BankSession::transfer`], await their first stage and only start the
//! second when the first returned `Ok`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, ReceiptRoute};
use crate::domain::interpretation::authentic_coin_value;
use crate::domain::response::{
    decode_balance, decode_check_issued, decode_deposit, decode_receipt, decode_stack,
};
use crate::domain::result::{Error, Result};
use crate::domain::stack::{pending_stack_file_name, stack_file_name};
use crate::domain::{
    interpret, BalanceSnapshot, BankKeys, CheckIssued, CoinStack, DepositResponse,
    Interpretation, PendingTransfer, Receipt, StatusTags,
};
use crate::ports::{HttpGateway, StackStore};
use crate::services::endpoints::Endpoints;

/// Outcome of a reconcile-and-withdraw chain
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub receipt_id: String,
    /// Face value of the authentic notes on the receipt
    pub authentic_coins: u64,
    /// Amount requested from the bank (running total plus authentic coins)
    pub amount_withdrawn: u64,
    #[serde(skip)]
    pub stack: CoinStack,
}

/// Session bound to one CloudBank account
pub struct BankSession {
    keys: BankKeys,
    gateway: Arc<dyn HttpGateway>,
    store: Arc<dyn StackStore>,
    endpoints: Endpoints,
    status_tags: StatusTags,

    /// Stack waiting to be deposited
    outbound: Option<CoinStack>,
    /// Stack returned by the last withdrawal
    withdrawn: Option<CoinStack>,
    receipt_number: Option<String>,
    last_receipt: Option<Receipt>,
    total_withdrawn: u64,
    balance: Option<BalanceSnapshot>,
}

impl BankSession {
    /// Create a session against `https://<public key>/` with default status tags
    pub fn new(keys: BankKeys, gateway: Arc<dyn HttpGateway>, store: Arc<dyn StackStore>) -> Self {
        Self {
            keys,
            gateway,
            store,
            endpoints: Endpoints::new("https", ReceiptRoute::default()),
            status_tags: StatusTags::default(),
            outbound: None,
            withdrawn: None,
            receipt_number: None,
            last_receipt: None,
            total_withdrawn: 0,
            balance: None,
        }
    }

    /// Create a session using the scheme, receipt route and status tags from config
    pub fn with_config(
        keys: BankKeys,
        gateway: Arc<dyn HttpGateway>,
        store: Arc<dyn StackStore>,
        config: &Config,
    ) -> Self {
        let mut session = Self::new(keys, gateway, store);
        session.endpoints = Endpoints::new(config.scheme.clone(), config.receipt_route);
        session.status_tags = config.status_tags.clone();
        session
    }

    pub fn keys(&self) -> &BankKeys {
        &self.keys
    }

    fn host(&self) -> &str {
        &self.keys.public_key
    }

    // -------------------------------------------------------------------------
    // Balance
    // -------------------------------------------------------------------------

    /// Ask the bank for the account's note counts
    ///
    /// The stored snapshot is only replaced when the bank answers with the
    /// balance success tag.
    pub async fn inquire_balance(&mut self) -> Result<BalanceSnapshot> {
        let url = self.endpoints.show_coins(self.host())?;
        debug!(host = %self.host(), "requesting balance");

        let raw = self
            .gateway
            .post_form(&url, &[("pk", self.keys.private_key.as_str())])
            .await?;

        let snapshot = decode_balance(raw.status, &raw.body, &self.status_tags)?
            .into_result()
            .inspect_err(|e| warn!(operation = "balance", error = %e, "balance inquiry failed"))?;

        info!(total = snapshot.total(), notes = snapshot.note_count(), "balance refreshed");
        self.balance = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Last successful balance snapshot
    pub fn balance(&self) -> Option<&BalanceSnapshot> {
        self.balance.as_ref()
    }

    // -------------------------------------------------------------------------
    // Deposits
    // -------------------------------------------------------------------------

    /// Read a stack file into the pending deposit slot, replacing any stack
    /// already there
    pub fn load_stack(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let stack = CoinStack::from_bytes(self.store.read(path)?)?;
        debug!(path = %path.display(), bytes = stack.len(), "stack loaded");
        self.outbound = Some(stack);
        Ok(())
    }

    /// Whether a stack is waiting to be deposited
    pub fn has_pending_stack(&self) -> bool {
        self.outbound.is_some()
    }

    /// Deposit the pending stack into this account, or into `target`'s account
    ///
    /// On success the receipt number is recorded and the pending stack is
    /// consumed. On failure the pending stack stays in place.
    pub async fn deposit_stack(&mut self, target: Option<&str>) -> Result<DepositResponse> {
        let stack = self.outbound.as_ref().ok_or_else(|| {
            Error::precondition("No stack is pending; load a stack file or cash a check first")
        })?;
        let host = target.unwrap_or(&self.keys.public_key);
        let url = self.endpoints.deposit_one_stack(host)?;
        debug!(host = %host, bytes = stack.len(), "depositing stack");

        let raw = self
            .gateway
            .post_form(
                &url,
                &[
                    ("pk", self.keys.private_key.as_str()),
                    ("stack", stack.as_str()),
                ],
            )
            .await?;

        let deposit = decode_deposit(raw.status, &raw.body, &self.status_tags)?
            .into_result()
            .inspect_err(|e| warn!(operation = "deposit", error = %e, "deposit failed"))?;

        info!(
            receipt = deposit.receipt_id.as_deref().unwrap_or_default(),
            message = %deposit.message,
            "deposit accepted"
        );
        self.receipt_number = deposit.receipt_id.clone();
        self.outbound = None;
        Ok(deposit)
    }

    // -------------------------------------------------------------------------
    // Receipts
    // -------------------------------------------------------------------------

    /// Receipt number of the last successful deposit
    pub fn receipt_number(&self) -> Option<&str> {
        self.receipt_number.as_deref()
    }

    /// Fetch the receipt for the last successful deposit
    pub async fn fetch_receipt(&mut self) -> Result<Receipt> {
        let receipt_id = self.receipt_number.clone().ok_or_else(|| {
            Error::precondition("No receipt number recorded; deposit a stack first")
        })?;
        self.fetch_receipt_by_id(&receipt_id).await
    }

    /// Fetch a receipt by ID
    ///
    /// The receipt is cached for [`Self::interpret_receipt`]; the recorded
    /// receipt number is left alone.
    pub async fn fetch_receipt_by_id(&mut self, receipt_id: &str) -> Result<Receipt> {
        if receipt_id.trim().is_empty() {
            return Err(Error::precondition("Receipt ID cannot be empty"));
        }
        let url = self
            .endpoints
            .receipt(self.host(), &self.keys.private_key, receipt_id)?;
        debug!(host = %self.host(), receipt = receipt_id, "fetching receipt");

        let raw = self.gateway.get(&url).await?;
        let receipt = decode_receipt(raw.status, &raw.body)?
            .into_result()
            .inspect_err(|e| warn!(operation = "receipt", error = %e, "receipt retrieval failed"))?;

        self.last_receipt = Some(receipt.clone());
        Ok(receipt)
    }

    /// Last receipt retrieved in this session
    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.last_receipt.as_ref()
    }

    /// Interpret the last retrieved receipt
    pub fn interpret_receipt(&self) -> Result<Interpretation> {
        let receipt = self
            .last_receipt
            .as_ref()
            .ok_or_else(|| Error::precondition("No receipt has been retrieved yet"))?;
        interpret(receipt)
    }

    // -------------------------------------------------------------------------
    // Withdrawals
    // -------------------------------------------------------------------------

    /// Amount requested by the last successful withdrawal
    pub fn total_withdrawn(&self) -> u64 {
        self.total_withdrawn
    }

    /// Withdraw `amount` coins from the account
    ///
    /// On success the returned stack becomes the withdrawn stack and `amount`
    /// becomes the withdrawn total.
    pub async fn withdraw(&mut self, amount: u64) -> Result<CoinStack> {
        if amount == 0 {
            return Err(Error::precondition("Withdrawal amount must be greater than zero"));
        }
        let url = self.endpoints.withdraw_account(self.host())?;
        let amount_field = amount.to_string();
        debug!(host = %self.host(), amount, "withdrawing");

        let raw = self
            .gateway
            .post_form(
                &url,
                &[
                    ("amount", amount_field.as_str()),
                    ("pk", self.keys.private_key.as_str()),
                ],
            )
            .await?;

        let stack = decode_stack(raw.status, &raw.body)?
            .into_result()
            .inspect_err(|e| warn!(operation = "withdraw", amount, error = %e, "withdrawal failed"))?;

        info!(amount, bytes = stack.len(), "withdrawal received");
        self.withdrawn = Some(stack.clone());
        self.total_withdrawn = amount;
        Ok(stack)
    }

    /// Fetch the last deposit's receipt, add its authentic coin value to the
    /// running withdrawn total, then withdraw that total
    ///
    /// If the receipt cannot be fetched or classified, no withdrawal is sent.
    pub async fn reconcile_and_withdraw(&mut self) -> Result<Reconciliation> {
        let receipt = self.fetch_receipt().await.inspect_err(|e| {
            warn!(error = %e, "receipt stage failed; withdrawal not attempted")
        })?;
        let authentic_coins = authentic_coin_value(&receipt).inspect_err(|e| {
            warn!(error = %e, "receipt could not be classified; withdrawal not attempted")
        })?;

        let amount = self
            .total_withdrawn
            .checked_add(authentic_coins)
            .ok_or_else(|| Error::decode("withdrawal total overflows"))?;
        debug!(
            receipt = %receipt.receipt_id,
            authentic_coins,
            amount,
            "receipt reconciled"
        );

        let stack = self.withdraw(amount).await?;

        Ok(Reconciliation {
            receipt_id: receipt.receipt_id,
            authentic_coins,
            amount_withdrawn: amount,
            stack,
        })
    }

    /// File name for the last withdrawn stack
    pub fn name_output_file(&self) -> String {
        stack_file_name(self.total_withdrawn, self.receipt_number.as_deref())
    }

    /// Write the last withdrawn stack into `dir` and return the file path
    pub fn save_withdrawn_stack(&self, dir: &Path) -> Result<PathBuf> {
        let stack = self
            .withdrawn
            .as_ref()
            .ok_or_else(|| Error::precondition("Nothing has been withdrawn yet"))?;
        let path = dir.join(self.name_output_file());
        self.store.write(&path, stack.as_bytes())?;
        info!(path = %path.display(), "withdrawn stack saved");
        Ok(path)
    }

    /// Write the stack waiting to be deposited into `dir` and return the path
    ///
    /// Used when a deposit fails after the coins already left the bank, such
    /// as a cashed check whose proceeds could not be deposited.
    pub fn save_pending_stack(&self, dir: &Path) -> Result<PathBuf> {
        let stack = self
            .outbound
            .as_ref()
            .ok_or_else(|| Error::precondition("No stack is pending"))?;
        let path = dir.join(pending_stack_file_name());
        self.store.write(&path, stack.as_bytes())?;
        info!(path = %path.display(), "pending stack saved");
        Ok(path)
    }

    // -------------------------------------------------------------------------
    // Transfers
    // -------------------------------------------------------------------------

    /// Move `amount` coins from this account into `target`'s account
    ///
    /// Withdraws first and deposits only if the withdrawal succeeded. If the
    /// deposit leg fails the withdrawn stack is kept as the pending stack so
    /// it can be deposited again or saved.
    pub async fn transfer(&mut self, target: &str, amount: u64) -> Result<PendingTransfer> {
        if target.trim().is_empty() {
            return Err(Error::precondition("Transfer target cannot be empty"));
        }
        let mut pending = PendingTransfer::new(target, amount);

        let stack = self.withdraw(amount).await.inspect_err(|e| {
            warn!(to = %target, amount, error = %e, "withdrawal failed; transfer aborted before deposit")
        })?;
        pending.withdrawn_stack = Some(stack.clone());
        self.outbound = Some(stack);

        let deposit = self.deposit_stack(Some(target)).await.inspect_err(|e| {
            warn!(to = %target, amount, error = %e, "deposit leg failed; withdrawn stack kept pending")
        })?;
        pending.deposit_receipt = deposit.receipt_id;

        info!(to = %target, amount, "transfer completed");
        Ok(pending)
    }

    // -------------------------------------------------------------------------
    // Checks
    // -------------------------------------------------------------------------

    /// Ask the bank to write a check; the reply message says how to redeem it
    pub async fn write_check(
        &mut self,
        amount: u64,
        payee: &str,
        signer: &str,
        memo: &str,
    ) -> Result<CheckIssued> {
        if amount == 0 {
            return Err(Error::precondition("Check amount must be greater than zero"));
        }
        if payee.trim().is_empty() {
            return Err(Error::precondition("Check payee cannot be empty"));
        }
        let url = self.endpoints.write_check(self.host())?;
        let amount_field = amount.to_string();
        debug!(host = %self.host(), amount, "writing check");

        let raw = self
            .gateway
            .post_form(
                &url,
                &[
                    ("pk", self.keys.private_key.as_str()),
                    ("amount", amount_field.as_str()),
                    ("payto", payee),
                    ("signby", signer),
                    ("Memo", memo),
                ],
            )
            .await?;

        let issued = decode_check_issued(raw.status, &raw.body, &self.status_tags)?
            .into_result()
            .inspect_err(|e| warn!(operation = "write_check", error = %e, "check not written"))?;

        info!(amount, "check written");
        Ok(issued)
    }

    /// Redeem a check; the returned stack becomes the pending deposit
    ///
    /// A failed redemption leaves any pending stack untouched.
    pub async fn cash_check(&mut self, check_id: &str) -> Result<CoinStack> {
        if check_id.trim().is_empty() {
            return Err(Error::precondition("Check ID cannot be empty"));
        }
        let url = self.endpoints.cash_check(self.host(), check_id)?;
        debug!(host = %self.host(), check = check_id, "cashing check");

        let raw = self
            .gateway
            .post_form(&url, &[("pk", self.keys.private_key.as_str())])
            .await?;

        let stack = decode_stack(raw.status, &raw.body)?
            .into_result()
            .inspect_err(|e| warn!(operation = "cash_check", error = %e, "check not cashed"))?;

        info!(check = check_id, bytes = stack.len(), "check cashed");
        self.outbound = Some(stack.clone());
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MemoryStackStore, ScriptedGateway};
    use crate::ports::RawResponse;
    use crate::services::endpoints::{
        CHECKS, DEPOSIT_ONE_STACK, GET_RECEIPT, SHOW_COINS, WITHDRAW_ACCOUNT, WRITE_CHECK,
    };
    use serde_json::json;

    const STACK_PATH: &str = "/coins/100.CloudCoin.stack";

    fn stack_json() -> serde_json::Value {
        json!({"cloudcoin": [{"nn": "1", "sn": "1000000", "an": ["a", "b"], "ed": "9-2020", "pown": "ppp"}]})
    }

    fn balance_json() -> serde_json::Value {
        json!({
            "bank_server": "bank.test",
            "time": "2018-06-15 14:22:01",
            "status": "coins_shown",
            "ones": 1, "fives": 2, "twentyfives": 0, "hundreds": 1, "twohundredfifties": 0
        })
    }

    fn deposit_json(receipt: &str) -> serde_json::Value {
        json!({
            "bank_server": "bank.test",
            "status": "importing",
            "message": "The stack file has been imported and detection will begin automatically.",
            "receipt": receipt
        })
    }

    fn receipt_json(receipt: &str) -> serde_json::Value {
        json!({
            "receipt_id": receipt,
            "bank_server": "bank.test",
            "time": "2018-06-15 14:22:01",
            "timezone": "UTC-7",
            "total_authentic": 2,
            "total_fracked": 0,
            "total_counterfeit": 1,
            "total_lost": 0,
            "receipt_detail": [
                {"nn": 1, "sn": 1000000, "status": "authentic", "pown": "ppppp", "note": "Moved to Bank"},
                {"nn": 1, "sn": 3000000, "status": "authentic", "pown": "ppppp", "note": "Moved to Bank"},
                {"nn": 1, "sn": 1, "status": "counterfeit", "pown": "fffff", "note": "Sent to trash"}
            ]
        })
    }

    fn fail_json(message: &str) -> serde_json::Value {
        json!({"status": "fail", "message": message})
    }

    fn keys() -> BankKeys {
        BankKeys::new("bank.test", "pk-secret", "me@test")
    }

    fn session(gateway: &Arc<ScriptedGateway>, store: &Arc<MemoryStackStore>) -> BankSession {
        BankSession::new(keys(), gateway.clone(), store.clone())
    }

    fn store_with_stack() -> Arc<MemoryStackStore> {
        Arc::new(MemoryStackStore::new().with_file(STACK_PATH, &stack_json().to_string()))
    }

    // -------------------------------------------------------------------------
    // Balance
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_inquire_balance_stores_snapshot() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(SHOW_COINS, balance_json()));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let snapshot = bank.inquire_balance().await.unwrap();
        assert_eq!(snapshot.total(), 1 + 10 + 100);
        assert_eq!(bank.balance(), Some(&snapshot));

        let calls = gateway.calls();
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, "https://bank.test/show_coins.aspx");
        assert_eq!(calls[0].field("pk"), Some("pk-secret"));
    }

    #[tokio::test]
    async fn test_inquire_balance_twice_is_idempotent() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(SHOW_COINS, balance_json())
                .reply_json(SHOW_COINS, balance_json()),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let first = bank.inquire_balance().await.unwrap();
        let second = bank.inquire_balance().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_rejected_balance_keeps_previous_snapshot() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(SHOW_COINS, balance_json())
                .reply_json(SHOW_COINS, fail_json("Private key not found")),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let first = bank.inquire_balance().await.unwrap();
        let err = bank.inquire_balance().await.unwrap_err();

        assert!(err.is_rejection());
        assert!(err.to_string().contains("Private key not found"));
        assert_eq!(bank.balance(), Some(&first));
    }

    // -------------------------------------------------------------------------
    // Deposits and receipts
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_deposit_without_stack_sends_nothing() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let err = bank.deposit_stack(None).await.unwrap_err();
        assert!(err.is_precondition());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        assert!(bank.load_stack("/nowhere.stack").is_err());
        assert!(!bank.has_pending_stack());
    }

    #[tokio::test]
    async fn test_deposit_records_receipt_and_consumes_stack() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-1")));
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        let deposit = bank.deposit_stack(None).await.unwrap();

        assert_eq!(deposit.receipt_id.as_deref(), Some("rn-1"));
        assert_eq!(bank.receipt_number(), Some("rn-1"));
        assert!(!bank.has_pending_stack());

        let call = &gateway.calls()[0];
        assert_eq!(call.url, "https://bank.test/deposit_one_stack.aspx");
        assert_eq!(call.field("stack"), Some(stack_json().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_deposit_to_third_party_uses_their_host() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-2")));
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(Some("friend.test")).await.unwrap();

        assert_eq!(gateway.calls()[0].url, "https://friend.test/deposit_one_stack.aspx");
    }

    #[tokio::test]
    async fn test_failed_deposit_keeps_stack_pending() {
        let gateway = Arc::new(
            ScriptedGateway::new().reply_json(DEPOSIT_ONE_STACK, fail_json("Stack is malformed")),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        let err = bank.deposit_stack(None).await.unwrap_err();

        assert!(err.is_rejection());
        assert!(bank.has_pending_stack());
        assert!(bank.receipt_number().is_none());
    }

    #[tokio::test]
    async fn test_fetch_receipt_without_deposit_sends_nothing() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        assert!(bank.fetch_receipt().await.unwrap_err().is_precondition());
        assert!(bank.interpret_receipt().unwrap_err().is_precondition());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_and_interpret_receipt() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-3"))
                .reply_json(GET_RECEIPT, receipt_json("rn-3")),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(None).await.unwrap();
        bank.fetch_receipt().await.unwrap();

        let interpretation = bank.interpret_receipt().unwrap();
        assert_eq!(interpretation.total_authentic_notes, 2);
        assert_eq!(interpretation.total_authentic_coins, 6);

        let receipt_call = &gateway.calls()[1];
        assert_eq!(receipt_call.method, "GET");
        assert_eq!(
            receipt_call.url,
            "https://bank.test/get_receipt.aspx?rn=rn-3&pk=pk-secret"
        );
    }

    #[tokio::test]
    async fn test_fetch_receipt_by_id_keeps_recorded_number() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(GET_RECEIPT, receipt_json("old")));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let receipt = bank.fetch_receipt_by_id("old").await.unwrap();
        assert_eq!(receipt.receipt_id, "old");
        assert!(bank.receipt_number().is_none());
        assert_eq!(bank.last_receipt(), Some(&receipt));
    }

    // -------------------------------------------------------------------------
    // Withdrawals and reconciliation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_withdraw_records_stack_and_amount() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(WITHDRAW_ACCOUNT, stack_json()));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let stack = bank.withdraw(25).await.unwrap();
        assert_eq!(stack.as_str(), stack_json().to_string());
        assert_eq!(bank.total_withdrawn(), 25);

        let call = &gateway.calls()[0];
        assert_eq!(call.field("amount"), Some("25"));
        assert_eq!(call.field("pk"), Some("pk-secret"));
    }

    #[tokio::test]
    async fn test_rejected_withdrawal_changes_nothing() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(WITHDRAW_ACCOUNT, stack_json())
                .reply_json(WITHDRAW_ACCOUNT, fail_json("Not enough coins")),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        bank.withdraw(5).await.unwrap();
        let err = bank.withdraw(5000).await.unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(bank.total_withdrawn(), 5);
    }

    #[tokio::test]
    async fn test_zero_withdrawal_is_precondition_error() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        assert!(bank.withdraw(0).await.unwrap_err().is_precondition());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_withdraws_authentic_value() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-4"))
                .reply_json(GET_RECEIPT, receipt_json("rn-4"))
                .reply_json(WITHDRAW_ACCOUNT, stack_json()),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(None).await.unwrap();
        let reconciliation = bank.reconcile_and_withdraw().await.unwrap();

        assert_eq!(reconciliation.receipt_id, "rn-4");
        assert_eq!(reconciliation.authentic_coins, 6);
        assert_eq!(reconciliation.amount_withdrawn, 6);

        let withdraw_call = gateway
            .calls()
            .into_iter()
            .find(|c| c.url.contains(WITHDRAW_ACCOUNT))
            .unwrap();
        assert_eq!(withdraw_call.field("amount"), Some("6"));
    }

    #[tokio::test]
    async fn test_reconcile_adds_to_running_total() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(WITHDRAW_ACCOUNT, stack_json())
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-5"))
                .reply_json(GET_RECEIPT, receipt_json("rn-5"))
                .reply_json(WITHDRAW_ACCOUNT, stack_json()),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.withdraw(10).await.unwrap();
        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(None).await.unwrap();
        let reconciliation = bank.reconcile_and_withdraw().await.unwrap();

        assert_eq!(reconciliation.amount_withdrawn, 16);
        assert_eq!(bank.total_withdrawn(), 16);
    }

    #[tokio::test]
    async fn test_reconcile_stops_when_receipt_fetch_fails() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-6"))
                .fail(GET_RECEIPT, "connection reset")
                .reply_json(WITHDRAW_ACCOUNT, stack_json()),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(None).await.unwrap();
        let err = bank.reconcile_and_withdraw().await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(gateway.calls_to(WITHDRAW_ACCOUNT), 0);
        assert_eq!(bank.total_withdrawn(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_stops_on_unclassifiable_serial() {
        let mut receipt = receipt_json("rn-7");
        receipt["receipt_detail"][0]["sn"] = json!(16_777_217);
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-7"))
                .reply_json(GET_RECEIPT, receipt),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(None).await.unwrap();

        assert!(matches!(
            bank.reconcile_and_withdraw().await,
            Err(Error::SerialOutOfRange(16_777_217))
        ));
        assert_eq!(gateway.calls_to(WITHDRAW_ACCOUNT), 0);
    }

    #[tokio::test]
    async fn test_reconcile_without_deposit_is_precondition_error() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        assert!(bank.reconcile_and_withdraw().await.unwrap_err().is_precondition());
        assert!(gateway.calls().is_empty());
    }

    // -------------------------------------------------------------------------
    // Output file naming
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_output_name_without_receipt_number() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(WITHDRAW_ACCOUNT, stack_json()));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        bank.withdraw(30).await.unwrap();
        let name = bank.name_output_file();
        assert!(name.starts_with("30.CloudCoin.Withdrawal"));
        assert!(name.ends_with(".stack"));
        assert_ne!(name, bank.name_output_file());
    }

    #[tokio::test]
    async fn test_output_name_with_receipt_number_and_save() {
        let store = store_with_stack();
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-8"))
                .reply_json(WITHDRAW_ACCOUNT, stack_json()),
        );
        let mut bank = session(&gateway, &store);

        assert!(bank.save_withdrawn_stack(Path::new("/out")).unwrap_err().is_precondition());

        bank.load_stack(STACK_PATH).unwrap();
        bank.deposit_stack(None).await.unwrap();
        bank.withdraw(6).await.unwrap();

        assert_eq!(bank.name_output_file(), "6.CloudCoin.rn-8.stack");
        let path = bank.save_withdrawn_stack(Path::new("/out")).unwrap();
        assert_eq!(path, PathBuf::from("/out/6.CloudCoin.rn-8.stack"));
        assert_eq!(store.contents(&path), Some(stack_json().to_string()));
    }

    // -------------------------------------------------------------------------
    // Transfers
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_transfer_withdraws_then_deposits_to_target() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(WITHDRAW_ACCOUNT, stack_json())
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-9")),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let transfer = bank.transfer("friend.test", 100).await.unwrap();
        assert!(transfer.is_complete());
        assert_eq!(transfer.amount_requested, 100);
        assert_eq!(transfer.deposit_receipt.as_deref(), Some("rn-9"));

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].url.contains(WITHDRAW_ACCOUNT));
        assert_eq!(calls[1].url, "https://friend.test/deposit_one_stack.aspx");
        assert_eq!(calls[1].field("stack"), Some(stack_json().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_transfer_never_deposits_after_rejected_withdrawal() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(WITHDRAW_ACCOUNT, fail_json("Not enough coins"))
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("never")),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let err = bank.transfer("friend.test", 1_000_000).await.unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(gateway.calls_to(DEPOSIT_ONE_STACK), 0);
        assert!(!bank.has_pending_stack());
    }

    #[tokio::test]
    async fn test_transfer_never_deposits_after_transport_failure() {
        let gateway = Arc::new(ScriptedGateway::new().fail(WITHDRAW_ACCOUNT, "timed out"));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        assert!(bank.transfer("friend.test", 5).await.unwrap_err().is_transport());
        assert_eq!(gateway.calls_to(DEPOSIT_ONE_STACK), 0);
    }

    #[tokio::test]
    async fn test_failed_deposit_leg_keeps_withdrawn_stack() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(WITHDRAW_ACCOUNT, stack_json())
                .reply(DEPOSIT_ONE_STACK, RawResponse::new(503, "Service Unavailable")),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let err = bank.transfer("friend.test", 5).await.unwrap_err();
        assert!(err.is_rejection());
        assert!(bank.has_pending_stack());
        assert_eq!(bank.total_withdrawn(), 5);
    }

    // -------------------------------------------------------------------------
    // Checks
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_write_check_sends_all_fields() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(
            WRITE_CHECK,
            json!({"status": "url", "message": "https://bank.test/checks.aspx?id=c-1"}),
        ));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        let issued = bank.write_check(50, "Alice", "Bob", "lunch").await.unwrap();
        assert_eq!(issued.message, "https://bank.test/checks.aspx?id=c-1");

        let call = &gateway.calls()[0];
        assert_eq!(call.field("amount"), Some("50"));
        assert_eq!(call.field("payto"), Some("Alice"));
        assert_eq!(call.field("signby"), Some("Bob"));
        assert_eq!(call.field("Memo"), Some("lunch"));
    }

    #[tokio::test]
    async fn test_cash_check_then_deposit() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(CHECKS, stack_json())
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-10")),
        );
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        bank.cash_check("c-1").await.unwrap();
        assert!(bank.has_pending_stack());
        bank.deposit_stack(None).await.unwrap();

        assert_eq!(gateway.calls()[0].url, "https://bank.test/checks.aspx?id=c-1");
        assert_eq!(bank.receipt_number(), Some("rn-10"));
    }

    #[tokio::test]
    async fn test_failed_cash_check_keeps_loaded_stack() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(CHECKS, fail_json("Check already cashed"))
                .reply_json(DEPOSIT_ONE_STACK, deposit_json("rn-11")),
        );
        let mut bank = session(&gateway, &store_with_stack());

        bank.load_stack(STACK_PATH).unwrap();
        let err = bank.cash_check("c-2").await.unwrap_err();
        assert!(err.to_string().contains("Check already cashed"));

        bank.deposit_stack(None).await.unwrap();
        let deposit_call = &gateway.calls()[1];
        assert_eq!(deposit_call.field("stack"), Some(stack_json().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_failed_deposit_after_cash_check_keeps_proceeds() {
        let store = Arc::new(MemoryStackStore::new());
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_json(CHECKS, stack_json())
                .reply(DEPOSIT_ONE_STACK, RawResponse::new(503, "Service Unavailable")),
        );
        let mut bank = session(&gateway, &store);

        assert!(bank.save_pending_stack(Path::new("/out")).unwrap_err().is_precondition());

        bank.cash_check("c-3").await.unwrap();
        let err = bank.deposit_stack(None).await.unwrap_err();
        assert!(err.is_rejection());
        assert!(bank.has_pending_stack());

        let path = bank.save_pending_stack(Path::new("/out")).unwrap();
        assert!(path.starts_with("/out"));
        assert_eq!(store.contents(&path), Some(stack_json().to_string()));
    }

    #[tokio::test]
    async fn test_interpret_overflowing_receipt_totals_is_error() {
        let gateway = Arc::new(ScriptedGateway::new().reply_json(
            GET_RECEIPT,
            json!({"receipt_id": "r", "total_authentic": u64::MAX, "total_fracked": 1}),
        ));
        let mut bank = session(&gateway, &Arc::new(MemoryStackStore::new()));

        bank.fetch_receipt_by_id("r").await.unwrap();
        assert!(matches!(bank.interpret_receipt(), Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn test_config_scheme_and_receipt_route() {
        let mut config = Config::default();
        config.scheme = "http".to_string();
        config.receipt_route = ReceiptRoute::Path;

        let gateway = Arc::new(ScriptedGateway::new().reply_json("Receipts", receipt_json("rn-12")));
        let mut bank = BankSession::with_config(
            keys(),
            gateway.clone(),
            Arc::new(MemoryStackStore::new()),
            &config,
        );

        bank.fetch_receipt_by_id("rn-12").await.unwrap();
        assert_eq!(
            gateway.calls()[0].url,
            "http://bank.test/pk-secret/Receipts/rn-12.json"
        );
    }
}
