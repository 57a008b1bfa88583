//! 链式拦截器（Chain）
//!
//! 同一模式的三种实例化：普通查询（Query）、带资源授权的查询（ResourceQuery）、
//! 带资源授权的命令（Command）。链由有序拦截器列表构成，`execute` 时折叠为
//! 嵌套的续延（continuation）：`interceptors[0]` 在最外层，终端处理器在最内层。
//!
//! 每个拦截器持有 `next` 续延，自行决定是否/何时调用——可以在续延前后、
//! 替代续延或环绕续延执行逻辑。组合是纯包装：内层错误原样向外传播，
//! 任何拦截器都不默认吞错；外层拦截器因仍在调用栈上，失败时照常执行
//! 其“后置”逻辑。
//!
//! 查询结果以类型擦除（`Box<dyn Any + Send>`）穿过链路，在公开的
//! `execute` 处还原为调用方期望的类型。
//!
use crate::context::AppContext;
use axon_domain::error::{DomainError, DomainResult};
use async_trait::async_trait;
use std::any::{Any, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxAnySend = Box<dyn Any + Send>;

pub type QueryFuture<'a> = Pin<Box<dyn Future<Output = DomainResult<BoxAnySend>> + Send + 'a>>;
pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = DomainResult<()>> + Send + 'a>>;

type QueryHandlerFn = Box<dyn Fn(AppContext) -> QueryFuture<'static> + Send + Sync>;
type CommandHandlerFn = Box<dyn Fn(AppContext) -> CommandFuture<'static> + Send + Sync>;

// ---- 普通查询 ----

/// 查询链拦截器
#[async_trait]
pub trait QueryInterceptor: Send + Sync {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        next: QueryNext<'_>,
    ) -> DomainResult<BoxAnySend>;
}

/// 查询链的续延
pub struct QueryNext<'a> {
    action: &'a str,
    interceptors: &'a [Arc<dyn QueryInterceptor>],
    handler: &'a QueryHandlerFn,
}

impl<'a> QueryNext<'a> {
    pub fn run(self, ctx: &AppContext) -> QueryFuture<'a> {
        let ctx = ctx.clone();
        Box::pin(async move {
            match self.interceptors.split_first() {
                Some((head, rest)) => {
                    let next = QueryNext {
                        action: self.action,
                        interceptors: rest,
                        handler: self.handler,
                    };
                    head.intercept(&ctx, self.action, next).await
                }
                None => (self.handler)(ctx).await,
            }
        })
    }
}

/// 普通查询链
pub struct QueryChain {
    interceptors: Vec<Arc<dyn QueryInterceptor>>,
}

impl QueryChain {
    pub fn new(interceptors: Vec<Arc<dyn QueryInterceptor>>) -> Self {
        Self { interceptors }
    }

    pub async fn execute<R, F, Fut>(
        &self,
        ctx: &AppContext,
        action: &str,
        handler: F,
    ) -> DomainResult<R>
    where
        R: Send + 'static,
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<R>> + Send + 'static,
    {
        let erased: QueryHandlerFn = Box::new(move |ctx| {
            let fut = handler(ctx);
            Box::pin(async move { fut.await.map(|value| Box::new(value) as BoxAnySend) })
        });

        let next = QueryNext {
            action,
            interceptors: &self.interceptors,
            handler: &erased,
        };
        restore::<R>(next.run(ctx).await?)
    }
}

// ---- 带资源授权的查询 ----

/// 资源查询链拦截器
#[async_trait]
pub trait ResourceQueryInterceptor: Send + Sync {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: ResourceQueryNext<'_>,
    ) -> DomainResult<BoxAnySend>;
}

/// 资源查询链的续延
pub struct ResourceQueryNext<'a> {
    action: &'a str,
    resource: &'a str,
    interceptors: &'a [Arc<dyn ResourceQueryInterceptor>],
    handler: &'a QueryHandlerFn,
}

impl<'a> ResourceQueryNext<'a> {
    pub fn run(self, ctx: &AppContext) -> QueryFuture<'a> {
        let ctx = ctx.clone();
        Box::pin(async move {
            match self.interceptors.split_first() {
                Some((head, rest)) => {
                    let next = ResourceQueryNext {
                        action: self.action,
                        resource: self.resource,
                        interceptors: rest,
                        handler: self.handler,
                    };
                    head.intercept(&ctx, self.action, self.resource, next).await
                }
                None => (self.handler)(ctx).await,
            }
        })
    }
}

/// 带资源授权的查询链
pub struct ResourceQueryChain {
    interceptors: Vec<Arc<dyn ResourceQueryInterceptor>>,
}

impl ResourceQueryChain {
    pub fn new(interceptors: Vec<Arc<dyn ResourceQueryInterceptor>>) -> Self {
        Self { interceptors }
    }

    pub async fn execute<R, F, Fut>(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        handler: F,
    ) -> DomainResult<R>
    where
        R: Send + 'static,
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<R>> + Send + 'static,
    {
        let erased: QueryHandlerFn = Box::new(move |ctx| {
            let fut = handler(ctx);
            Box::pin(async move { fut.await.map(|value| Box::new(value) as BoxAnySend) })
        });

        let next = ResourceQueryNext {
            action,
            resource,
            interceptors: &self.interceptors,
            handler: &erased,
        };
        restore::<R>(next.run(ctx).await?)
    }
}

// ---- 命令 ----

/// 命令链拦截器
#[async_trait]
pub trait CommandInterceptor: Send + Sync {
    async fn intercept(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        next: CommandNext<'_>,
    ) -> DomainResult<()>;
}

/// 命令链的续延
pub struct CommandNext<'a> {
    action: &'a str,
    resource: &'a str,
    interceptors: &'a [Arc<dyn CommandInterceptor>],
    handler: &'a CommandHandlerFn,
}

impl<'a> CommandNext<'a> {
    pub fn run(self, ctx: &AppContext) -> CommandFuture<'a> {
        let ctx = ctx.clone();
        Box::pin(async move {
            match self.interceptors.split_first() {
                Some((head, rest)) => {
                    let next = CommandNext {
                        action: self.action,
                        resource: self.resource,
                        interceptors: rest,
                        handler: self.handler,
                    };
                    head.intercept(&ctx, self.action, self.resource, next).await
                }
                None => (self.handler)(ctx).await,
            }
        })
    }
}

/// 命令链
pub struct CommandChain {
    interceptors: Vec<Arc<dyn CommandInterceptor>>,
}

impl CommandChain {
    pub fn new(interceptors: Vec<Arc<dyn CommandInterceptor>>) -> Self {
        Self { interceptors }
    }

    pub async fn execute<F, Fut>(
        &self,
        ctx: &AppContext,
        action: &str,
        resource: &str,
        handler: F,
    ) -> DomainResult<()>
    where
        F: Fn(AppContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<()>> + Send + 'static,
    {
        let erased: CommandHandlerFn = Box::new(move |ctx| Box::pin(handler(ctx)));

        let next = CommandNext {
            action,
            resource,
            interceptors: &self.interceptors,
            handler: &erased,
        };
        next.run(ctx).await
    }
}

// 还原类型擦除的查询结果；链与闭包共用同一泛型 R，正常情况下不会失败
fn restore<R: Send + 'static>(out: BoxAnySend) -> DomainResult<R> {
    match out.downcast::<R>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(DomainError::TypeMismatch {
            expected: type_name::<R>().to_string(),
            found: "erased query output".to_string(),
        }),
    }
}
