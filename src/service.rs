use alloc::sync::Arc;

/// A fallible, shared-reference call used to store factories, constructors, callable bodies and extenders.
///
/// Calls take `&self`: a service may be re-entered while it is running,
/// e.g. a factory that resolves another binding produced by the same closure.
pub(crate) trait Service<Request> {
    type Response;
    type Error;

    fn call(&self, request: Request) -> Result<Self::Response, Self::Error>;
}

/// Type-erased [`Service`]. Cloning only bumps the reference count,
/// so the service can be taken out of the container state before it's called.
pub(crate) struct SharedService<Request, Response, Error>(
    Arc<dyn Service<Request, Response = Response, Error = Error> + Send + Sync>,
);

impl<Request, Response, Error> SharedService<Request, Response, Error> {
    #[inline]
    #[must_use]
    pub(crate) fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Error> + Send + Sync + 'static,
    {
        Self(Arc::new(service))
    }
}

impl<Request, Response, Error> Clone for SharedService<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Request, Response, Error> Service<Request> for SharedService<Request, Response, Error> {
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&self, request: Request) -> Result<Self::Response, Self::Error> {
        self.0.call(request)
    }
}

#[inline]
#[must_use]
pub(crate) const fn service_fn<F>(f: F) -> ServiceFn<F> {
    ServiceFn { f }
}

#[derive(Clone)]
pub(crate) struct ServiceFn<F> {
    f: F,
}

impl<F, Request, Response, Error> Service<Request> for ServiceFn<F>
where
    F: Fn(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&self, request: Request) -> Result<Self::Response, Self::Error> {
        (self.f)(request)
    }
}
