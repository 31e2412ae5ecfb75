//! Business logic services for the Chemical Manufacturing Inventory Platform

pub mod batch;
pub mod chemical;
pub mod customer;
pub mod formula;
pub mod procurement;
pub mod product;
pub mod production;
pub mod sales;
pub mod supplier;

pub use batch::BatchService;
pub use chemical::ChemicalService;
pub use customer::CustomerService;
pub use formula::FormulaService;
pub use procurement::PurchaseOrderService;
pub use product::ProductService;
pub use production::ProductionService;
pub use sales::SalesService;
pub use supplier::SupplierService;
