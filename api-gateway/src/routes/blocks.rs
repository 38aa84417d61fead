use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use chain_manager::{Block, BlockHash, BlockStore, ChainError, Hash256, Message, Verdict};

use crate::state::SharedState;

type ApiError = (StatusCode, String);

/// Hex-encoded wire form of a [`Block`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDto {
    /// Hex-encoded parent hash; absent for genesis.
    #[serde(default)]
    pub parent: Option<String>,
    pub height: u64,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub state_root: Option<String>,
    /// Hex-encoded message payloads.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl From<&Block> for BlockDto {
    fn from(block: &Block) -> Self {
        Self {
            parent: block.parent.map(|p| p.0.to_hex()),
            height: block.height,
            nonce: block.nonce,
            state_root: block.state_root.map(|r| r.to_hex()),
            messages: block.messages.iter().map(|m| hex::encode(m.as_bytes())).collect(),
        }
    }
}

impl TryFrom<BlockDto> for Block {
    type Error = String;

    fn try_from(dto: BlockDto) -> Result<Self, Self::Error> {
        let parent = match dto.parent {
            Some(hex_str) => Some(
                BlockHash::from_hex(&hex_str).ok_or_else(|| format!("invalid parent hash: {hex_str}"))?,
            ),
            None => None,
        };
        let state_root = match dto.state_root {
            Some(hex_str) => Some(
                Hash256::from_hex(&hex_str)
                    .ok_or_else(|| format!("invalid state root: {hex_str}"))?,
            ),
            None => None,
        };
        let messages = dto
            .messages
            .iter()
            .map(|m| hex::decode(m).map(Message).map_err(|e| format!("invalid message hex: {e}")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Block {
            parent,
            height: dto.height,
            nonce: dto.nonce,
            state_root,
            messages,
        })
    }
}

/// Response for `GET /head`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeadResponse {
    pub hash: String,
    pub height: u64,
}

/// Response for `GET /blocks/{hash}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockResponse {
    pub hash: String,
    pub known_good: bool,
    pub block: BlockDto,
}

/// Response for `POST /blocks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitBlockResponse {
    pub hash: String,
    /// One of `accepted`, `valid`, `invalid`.
    pub verdict: String,
    /// Validation failure, for `invalid` only.
    pub reason: Option<String>,
}

/// `GET /head`
///
/// Returns the canonical tip, or 404 before the chain is bootstrapped.
pub async fn head(State(state): State<SharedState>) -> Result<Json<HeadResponse>, ApiError> {
    let best = state
        .manager
        .best_block()
        .ok_or_else(|| (StatusCode::NOT_FOUND, "no best block yet".to_string()))?;

    Ok(Json(HeadResponse {
        hash: best.hash.0.to_hex(),
        height: best.height,
    }))
}

/// `GET /blocks/{hash}`
pub async fn get_block(
    State(state): State<SharedState>,
    Path(hash_hex): Path<String>,
) -> Result<Json<BlockResponse>, ApiError> {
    let hash = BlockHash::from_hex(&hash_hex)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid block hash: {hash_hex}")))?;

    let block = state
        .manager
        .store()
        .get_block(&hash)
        .map_err(|e| {
            tracing::error!(%hash, "block lookup failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("storage error: {e}"))
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown block {hash}")))?;

    Ok(Json(BlockResponse {
        hash: hash.0.to_hex(),
        known_good: state.manager.is_known_good(&hash),
        block: BlockDto::from(&block),
    }))
}

/// `POST /blocks`
///
/// Runs the block through the chain manager on the blocking pool, bounded
/// by the configured processing timeout. Invalid blocks answer 422 with
/// the reason; an unresolvable ancestor answers 409 so the caller can
/// fetch the parent and resubmit.
pub async fn submit_block(
    State(state): State<SharedState>,
    Json(body): Json<BlockDto>,
) -> Result<(StatusCode, Json<SubmitBlockResponse>), ApiError> {
    let block = Block::try_from(body).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let hash = block.compute_hash();
    let deadline = Instant::now() + state.process_timeout;

    let worker = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        worker.manager.process_new_block_until(&block, deadline)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("block processing task failed: {e}"),
        )
    })?;

    let verdict = result.map_err(|e| chain_error_response(hash, e))?;

    let (status, reason) = match &verdict {
        Verdict::Invalid(reason) => (StatusCode::UNPROCESSABLE_ENTITY, Some(reason.to_string())),
        Verdict::Accepted | Verdict::Valid => (StatusCode::OK, None),
    };

    Ok((
        status,
        Json(SubmitBlockResponse {
            hash: hash.0.to_hex(),
            verdict: verdict.as_str().to_string(),
            reason,
        }),
    ))
}

fn chain_error_response(hash: BlockHash, err: ChainError) -> ApiError {
    let status = match &err {
        ChainError::UnknownAncestor { .. } => StatusCode::CONFLICT,
        ChainError::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
        ChainError::Storage(_) | ChainError::Corrupted(_) => {
            tracing::error!(%hash, "block processing failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use chain_manager::{
        BaseValidity, BlockStore, ChainManager, ConsensusConfig, InMemoryBlockStore,
        LongestChainForkChoice, MetricsRegistry,
    };

    use super::*;
    use crate::routes::router;
    use crate::state::AppState;

    fn test_state(cfg: ConsensusConfig) -> SharedState {
        let store: Arc<dyn BlockStore> = Arc::new(InMemoryBlockStore::new());
        let metrics = Arc::new(MetricsRegistry::new().expect("metrics registry"));
        let manager = ChainManager::new(store, BaseValidity::new(&cfg), LongestChainForkChoice)
            .with_metrics(metrics.chain.clone());
        Arc::new(AppState {
            manager,
            metrics,
            process_timeout: Duration::from_secs(5),
        })
    }

    fn bootstrapped() -> (SharedState, Router) {
        let state = test_state(ConsensusConfig::default());
        state
            .manager
            .set_best_block(&Block::genesis())
            .expect("bootstrap genesis");
        let app = router(state.clone());
        (state, app)
    }

    async fn get(app: &Router, path: &str) -> (StatusCode, Vec<u8>) {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn post_block(app: &Router, block: &Block) -> (StatusCode, Vec<u8>) {
        let body = serde_json::to_vec(&BlockDto::from(block)).unwrap();
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/blocks")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_, app) = bootstrapped();
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["best_height"], 0);
    }

    #[tokio::test]
    async fn head_is_404_before_bootstrap() {
        let app = router(test_state(ConsensusConfig::default()));
        let (status, _) = get(&app, "/head").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submit_extends_chain_and_moves_head() {
        let (_, app) = bootstrapped();
        let genesis = Block::genesis();
        let b1 = Block::child_of(&genesis, 0);

        let (status, body) = post_block(&app, &b1).await;
        assert_eq!(status, StatusCode::OK);
        let resp: SubmitBlockResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.verdict, "accepted");
        assert_eq!(resp.hash, b1.compute_hash().0.to_hex());
        assert!(resp.reason.is_none());

        let (status, body) = get(&app, "/head").await;
        assert_eq!(status, StatusCode::OK);
        let head: HeadResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(head.height, 1);
        assert_eq!(head.hash, resp.hash);
    }

    #[tokio::test]
    async fn shorter_fork_is_valid_not_accepted() {
        let (_, app) = bootstrapped();
        let genesis = Block::genesis();
        let b1 = Block::child_of(&genesis, 0);
        let b2 = Block::child_of(&b1, 0);
        let fork1 = Block::child_of(&genesis, 1);

        post_block(&app, &b1).await;
        post_block(&app, &b2).await;
        let (status, body) = post_block(&app, &fork1).await;

        assert_eq!(status, StatusCode::OK);
        let resp: SubmitBlockResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.verdict, "valid");
    }

    #[tokio::test]
    async fn height_mismatch_is_unprocessable() {
        let (_, app) = bootstrapped();
        let mut bad = Block::child_of(&Block::genesis(), 0);
        bad.height = 5;

        let (status, body) = post_block(&app, &bad).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let resp: SubmitBlockResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.verdict, "invalid");
        assert!(resp.reason.is_some());
    }

    #[tokio::test]
    async fn missing_parent_is_conflict_then_resolves() {
        let (state, app) = bootstrapped();
        let genesis = Block::genesis();
        let b1 = Block::child_of(&genesis, 0);
        let b2 = Block::child_of(&b1, 0);

        let (status, _) = post_block(&app, &b2).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!state.manager.is_known_good(&b2.compute_hash()));

        let (status, _) = post_block(&app, &b1).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = post_block(&app, &b2).await;
        assert_eq!(status, StatusCode::OK);
        let resp: SubmitBlockResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.verdict, "accepted");
    }

    #[tokio::test]
    async fn oversized_block_is_rejected_by_base_validity() {
        let state = test_state(ConsensusConfig {
            max_block_messages: 1,
            ..ConsensusConfig::default()
        });
        state.manager.set_best_block(&Block::genesis()).unwrap();
        let app = router(state);

        let mut b1 = Block::child_of(&Block::genesis(), 0);
        b1.messages = vec![Message(vec![1]), Message(vec![2])];

        let (status, _) = post_block(&app, &b1).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn get_block_reports_known_good_flag() {
        let (_, app) = bootstrapped();
        let genesis = Block::genesis();
        let b1 = Block::child_of(&genesis, 0);
        let b2 = Block::child_of(&b1, 0);

        // b2 is stored even though its ancestry is unresolved.
        post_block(&app, &b2).await;

        let path = format!("/blocks/{}", b2.compute_hash().0.to_hex());
        let (status, body) = get(&app, &path).await;
        assert_eq!(status, StatusCode::OK);
        let resp: BlockResponse = serde_json::from_slice(&body).unwrap();
        assert!(!resp.known_good);
        assert_eq!(resp.block.height, 2);
        assert_eq!(Block::try_from(resp.block).unwrap(), b2);

        let path = format!("/blocks/{}", genesis.compute_hash().0.to_hex());
        let (_, body) = get(&app, &path).await;
        let resp: BlockResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.known_good);
    }

    #[tokio::test]
    async fn get_block_rejects_bad_and_unknown_hashes() {
        let (_, app) = bootstrapped();

        let (status, _) = get(&app, "/blocks/not-hex").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = "ab".repeat(32);
        let (status, _) = get(&app, &format!("/blocks/{unknown}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_parent_hex_is_bad_request() {
        let (_, app) = bootstrapped();
        let body = serde_json::json!({ "parent": "zz", "height": 1 });
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/blocks")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submissions_update_metrics() {
        let (state, app) = bootstrapped();
        let b1 = Block::child_of(&Block::genesis(), 0);
        post_block(&app, &b1).await;

        assert_eq!(state.metrics.chain.blocks_accepted.get(), 1);
        assert_eq!(state.metrics.chain.best_height.get(), 1);

        let (status, body) = get(&app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("node_chain_blocks_accepted 1"));
    }
}
