use async_trait::async_trait;
use axon_application::activity::{ACTIVITY_COMPLETED, ActivityCompleted};
use axon_application::context::AppContext;
use axon_application::dispatch::{EventSubscriber, HandledEventType, InMemoryDispatcher};
use axon_application::pipeline::Pipeline;
use axon_domain::error::{DomainError, DomainResult};
use axon_domain::event::Event;
use axon_domain::policy::PolicyEngine;
use axon_domain::store::{Store, StoreTransaction};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ---- 内存存储：写入先进事务缓冲，提交时一并生效 ----

#[derive(Default)]
struct MemStore {
    data: Mutex<HashMap<String, i64>>,
}

struct MemTx {
    store: Arc<MemStore>,
    buffered: Mutex<HashMap<String, i64>>,
}

impl MemTx {
    fn set(&self, key: &str, value: i64) {
        self.buffered.lock().unwrap().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<i64> {
        if let Some(v) = self.buffered.lock().unwrap().get(key) {
            return Some(*v);
        }
        self.store.data.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl StoreTransaction for MemTx {
    async fn commit(&self) -> DomainResult<()> {
        let buffered = std::mem::take(&mut *self.buffered.lock().unwrap());
        self.store.data.lock().unwrap().extend(buffered);
        Ok(())
    }

    async fn rollback(&self) -> DomainResult<()> {
        self.buffered.lock().unwrap().clear();
        Ok(())
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

struct MemStoreHandle(Arc<MemStore>);

#[async_trait]
impl Store for MemStoreHandle {
    async fn begin(&self) -> DomainResult<Arc<dyn StoreTransaction>> {
        Ok(Arc::new(MemTx {
            store: self.0.clone(),
            buffered: Mutex::new(HashMap::new()),
        }))
    }
}

// ---- 策略：经理放行，其余主体不得执行命令 ----

struct ManagerOnly;

#[async_trait]
impl PolicyEngine for ManagerOnly {
    async fn authorize(&self, principal: &str, action: &str, _resource: &str) -> DomainResult<()> {
        if principal == "manager" {
            return Ok(());
        }
        Err(DomainError::permission(format!(
            "{principal} may not {action}"
        )))
    }
}

// ---- 事件与订阅方 ----

#[derive(Debug, Clone)]
struct OrderCompleted {
    order_id: String,
    item: String,
}

impl Event for OrderCompleted {
    fn name(&self) -> &'static str {
        "order.completed"
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

/// 订单完成时检查剩余库存
struct StockWatcher;

#[async_trait]
impl EventSubscriber for StockWatcher {
    fn subscriber_name(&self) -> &str {
        "stock-watcher"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One("order.completed")
    }

    async fn handle(&self, ctx: &AppContext, event: &dyn Event) -> DomainResult<()> {
        let completed = event
            .downcast_ref::<OrderCompleted>()
            .ok_or_else(|| DomainError::internal("unexpected event payload"))?;
        let uow = ctx
            .transaction()
            .ok_or_else(|| DomainError::internal("event handled outside a command"))?;
        let tx = uow
            .store_tx()
            .as_any()
            .downcast_ref::<MemTx>()
            .ok_or_else(|| DomainError::internal("unexpected transaction type"))?;

        let remaining = tx.get(&format!("stock:{}", completed.item)).unwrap_or(0);
        println!(
            "[stock-watcher] order {} consumed {}, {} left",
            completed.order_id, completed.item, remaining
        );
        Ok(())
    }
}

/// 打印每条命令的审计快照
struct AuditPrinter;

#[async_trait]
impl EventSubscriber for AuditPrinter {
    fn subscriber_name(&self) -> &str {
        "audit-printer"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One(ACTIVITY_COMPLETED)
    }

    async fn handle(&self, _ctx: &AppContext, event: &dyn Event) -> DomainResult<()> {
        let completed = event
            .downcast_ref::<ActivityCompleted>()
            .ok_or_else(|| DomainError::internal("unexpected event payload"))?;
        println!(
            "[audit] {}",
            serde_json::to_string(&completed.activity)?
        );
        Ok(())
    }
}

fn mem_tx(ctx: &AppContext) -> DomainResult<&MemTx> {
    let uow = ctx
        .transaction()
        .ok_or_else(|| DomainError::internal("command without transaction"))?;
    uow.store_tx()
        .as_any()
        .downcast_ref::<MemTx>()
        .ok_or_else(|| DomainError::internal("unexpected transaction type"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let store = Arc::new(MemStore::default());
    store.data.lock().unwrap().insert("stock:flour".into(), 10);

    let dispatcher = Arc::new(InMemoryDispatcher::new());
    dispatcher.register(Arc::new(StockWatcher));
    dispatcher.register(Arc::new(AuditPrinter));

    let pipeline = Pipeline::builder()
        .store(Arc::new(MemStoreHandle(store.clone())))
        .policy(Arc::new(ManagerOnly))
        .dispatcher(dispatcher)
        .build();

    // 经理完成一笔订单：扣库存、登记触达实体、发出领域事件
    let ctx = pipeline.context_for("manager");
    pipeline
        .command(&ctx, "order.complete", "order", |child| async move {
            let tx = mem_tx(&child)?;
            let remaining = tx.get("stock:flour").unwrap_or(0);
            if remaining < 3 {
                return Err(DomainError::invalid("insufficient stock"));
            }
            tx.set("stock:flour", remaining - 3);

            child.touch_entity("order-1");
            child.touch_entity("stock:flour");
            child.emit(OrderCompleted {
                order_id: "order-1".into(),
                item: "flour".into(),
            });
            Ok(())
        })
        .await
        .unwrap();

    // 查询提交后的库存
    let ctx = pipeline.context_for("manager");
    let remaining: i64 = pipeline
        .query(&ctx, "stock.level", {
            let store = store.clone();
            move |_child| {
                let store = store.clone();
                async move { Ok(store.data.lock().unwrap().get("stock:flour").copied().unwrap_or(0)) }
            }
        })
        .await
        .unwrap();
    println!("stock:flour = {remaining}");

    // 访客发起同一命令：授权门拒绝，处理器不执行
    let ctx = pipeline.context_for("guest");
    let err = pipeline
        .command(&ctx, "order.complete", "order", |_child| async { Ok(()) })
        .await
        .unwrap_err();
    println!("guest attempt rejected: {err}");
}
